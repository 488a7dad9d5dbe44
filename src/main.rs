fn main() {
    if let Err(err) = deferred_renderer::run() {
        eprintln!("Application error: {err}");
    }
}
