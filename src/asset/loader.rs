use std::error::Error;
use std::path::Path;

use crate::error::LoadError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptResponse {
    Retry,
    Cancel,
}

/// Decides what happens when a recoverable asset load fails: try the same
/// load again, or give up and hand the error back to the caller.
pub trait AssetErrorPrompt {
    fn on_error(&mut self, asset: &Path, error: &dyn Error) -> PromptResponse;
}

/// Default prompt: report the failure and cancel.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAndCancel;

impl AssetErrorPrompt for LogAndCancel {
    fn on_error(&mut self, asset: &Path, error: &dyn Error) -> PromptResponse {
        log::error!("Failed to load {:?}: {}", asset, error);
        PromptResponse::Cancel
    }
}

impl LoadError {
    /// Errors the user can plausibly fix between attempts: a missing file or
    /// a texture that fails to decode. An unknown DDS fourCC and malformed
    /// meshes fail without asking.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            LoadError::Io { .. }
                | LoadError::Image { .. }
                | LoadError::DdsTruncated(_)
                | LoadError::DdsMagic
        )
    }
}

/// Runs `load` until it succeeds, fails with an unrecoverable error, or the
/// prompt answers [`PromptResponse::Cancel`].
pub(crate) fn load_with_prompt<T, E>(
    prompt: &mut dyn AssetErrorPrompt,
    asset: &Path,
    recoverable: impl Fn(&E) -> bool,
    mut load: impl FnMut() -> Result<T, E>,
) -> Result<T, E>
where
    E: Error,
{
    loop {
        match load() {
            Ok(value) => return Ok(value),
            Err(err) if !recoverable(&err) => return Err(err),
            Err(err) => match prompt.on_error(asset, &err) {
                PromptResponse::Retry => {
                    log::info!("Retrying load of {:?}", asset);
                }
                PromptResponse::Cancel => return Err(err),
            },
        }
    }
}

pub(crate) fn read_file(path: &Path) -> Result<Vec<u8>, LoadError> {
    std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn read_to_string(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn has_obj_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("obj"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    struct Scripted {
        responses: Vec<PromptResponse>,
        calls: usize,
    }

    impl AssetErrorPrompt for Scripted {
        fn on_error(&mut self, _asset: &Path, _error: &dyn Error) -> PromptResponse {
            let response = self.responses[self.calls];
            self.calls += 1;
            response
        }
    }

    fn missing(path: &str) -> LoadError {
        LoadError::Io {
            path: PathBuf::from(path),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        }
    }

    #[test]
    fn retry_repeats_the_same_load() {
        let mut prompt = Scripted {
            responses: vec![PromptResponse::Retry, PromptResponse::Retry],
            calls: 0,
        };
        let mut attempts = 0;
        let result = load_with_prompt(
            &mut prompt,
            Path::new("brick.png"),
            LoadError::is_recoverable,
            || {
                attempts += 1;
                if attempts < 3 {
                    Err(missing("brick.png"))
                } else {
                    Ok(attempts)
                }
            },
        );

        assert_eq!(result.unwrap(), 3);
        assert_eq!(prompt.calls, 2);
    }

    #[test]
    fn cancel_returns_the_error() {
        let mut prompt = LogAndCancel;
        let result: Result<(), _> = load_with_prompt(
            &mut prompt,
            Path::new("brick.png"),
            LoadError::is_recoverable,
            || Err(missing("brick.png")),
        );

        assert!(matches!(result, Err(LoadError::Io { .. })));
    }

    #[test]
    fn unrecoverable_errors_skip_the_prompt() {
        let mut prompt = Scripted {
            responses: vec![],
            calls: 0,
        };
        let result: Result<(), _> = load_with_prompt(
            &mut prompt,
            Path::new("rock.dds"),
            LoadError::is_recoverable,
            || Err(LoadError::UnsupportedFourCc(*b"ATI2")),
        );

        assert!(matches!(result, Err(LoadError::UnsupportedFourCc(_))));
        assert_eq!(prompt.calls, 0);
    }

    #[test]
    fn truncated_dds_goes_through_the_prompt() {
        let mut prompt = Scripted {
            responses: vec![PromptResponse::Retry, PromptResponse::Cancel],
            calls: 0,
        };
        let mut bytes = b"DDS ".to_vec();
        bytes.extend_from_slice(&[0; 40]);

        let result = load_with_prompt(
            &mut prompt,
            Path::new("rock.dds"),
            LoadError::is_recoverable,
            || crate::asset::dds::parse(&bytes).map(|image| image.levels.len()),
        );

        assert!(matches!(result, Err(LoadError::DdsTruncated("header"))));
        assert_eq!(prompt.calls, 2);
    }

    #[test]
    fn texture_decode_failures_are_recoverable_but_four_cc_is_not() {
        assert!(LoadError::DdsTruncated("header").is_recoverable());
        assert!(LoadError::DdsMagic.is_recoverable());
        assert!(!LoadError::UnsupportedFourCc(*b"ATI2").is_recoverable());
        assert!(!LoadError::EmptyMesh { vertices: 0, indices: 0 }.is_recoverable());
    }

    #[test]
    fn obj_extension_is_case_insensitive() {
        assert!(has_obj_extension(Path::new("models/teapot.OBJ")));
        assert!(has_obj_extension(Path::new("teapot.obj")));
        assert!(!has_obj_extension(Path::new("teapot.mesh")));
        assert!(!has_obj_extension(Path::new("obj")));
    }
}
