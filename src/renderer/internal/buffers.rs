use std::mem;
use std::num::NonZeroU64;

use bytemuck::Zeroable;
use wgpu::util::DeviceExt;

use crate::renderer::uniforms::{CameraUniform, LightUniform, ObjectData, LIGHT_UNIFORM_STRIDE};

/// Creates a buffer initialised with `contents`.
pub(crate) fn create_buffer(
    device: &wgpu::Device,
    label: &str,
    usage: wgpu::BufferUsages,
    contents: &[u8],
) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents,
        usage,
    })
}

fn uniform_layout_entry(
    binding: u32,
    visibility: wgpu::ShaderStages,
    has_dynamic_offset: bool,
    size: usize,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset,
            min_binding_size: NonZeroU64::new(size as u64),
        },
        count: None,
    }
}

pub(crate) struct CameraBuffer {
    pub(crate) buffer: wgpu::Buffer,
    pub(crate) bind_group: wgpu::BindGroup,
    pub(crate) bind_layout: wgpu::BindGroupLayout,
}

impl CameraBuffer {
    pub(crate) fn new(device: &wgpu::Device) -> Self {
        let camera = CameraUniform::zeroed();
        let buffer = create_buffer(
            device,
            "CameraBuffer",
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            bytemuck::bytes_of(&camera),
        );

        let bind_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("CameraBindLayout"),
            entries: &[uniform_layout_entry(
                0,
                wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                false,
                mem::size_of::<CameraUniform>(),
            )],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("CameraBindGroup"),
            layout: &bind_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });

        Self {
            buffer,
            bind_group,
            bind_layout,
        }
    }

    pub(crate) fn update(&self, queue: &wgpu::Queue, camera: &CameraUniform) {
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(camera));
    }
}

/// Per-object transforms and material parameters, read by instance index.
/// Grows when a frame submits more draws than it can hold.
pub(crate) struct DynamicObjectsBuffer {
    pub(crate) buffer: wgpu::Buffer,
    pub(crate) capacity: u32,
    pub(crate) bind_group: wgpu::BindGroup,
    pub(crate) bind_layout: wgpu::BindGroupLayout,
}

impl DynamicObjectsBuffer {
    pub(crate) fn new(device: &wgpu::Device, capacity: u32) -> Self {
        let capacity = capacity.max(1);
        let bind_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("ObjectsBindLayout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Storage { read_only: true },
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let buffer = Self::create_storage(device, capacity);
        let bind_group = Self::create_bind_group(device, &bind_layout, &buffer);

        Self {
            buffer,
            capacity,
            bind_group,
            bind_layout,
        }
    }

    pub(crate) fn update(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, objects: &[ObjectData]) {
        let required = objects.len() as u32;
        if required > self.capacity {
            self.grow(device, required);
        }

        if !objects.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(objects));
        }
    }

    fn grow(&mut self, device: &wgpu::Device, required: u32) {
        let new_capacity = required.max(self.capacity * 2);
        log::info!(
            "Growing objects buffer: {} -> {}",
            self.capacity,
            new_capacity
        );

        self.buffer = Self::create_storage(device, new_capacity);
        self.bind_group = Self::create_bind_group(device, &self.bind_layout, &self.buffer);
        self.capacity = new_capacity;
    }

    fn create_storage(device: &wgpu::Device, capacity: u32) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("ObjectsBuffer"),
            size: (capacity as usize * mem::size_of::<ObjectData>()) as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        buffer: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("ObjectsBindGroup"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        })
    }
}

/// One `LightUniform` per light, each at a 256-byte aligned offset so a
/// single bind group serves every lighting draw through dynamic offsets.
pub(crate) struct LightUniformBuffer {
    pub(crate) buffer: wgpu::Buffer,
    pub(crate) capacity: u32,
    pub(crate) bind_group: wgpu::BindGroup,
    pub(crate) bind_layout: wgpu::BindGroupLayout,
    staging: Vec<u8>,
}

impl LightUniformBuffer {
    pub(crate) fn new(device: &wgpu::Device, capacity: u32) -> Self {
        let capacity = capacity.max(1);
        let bind_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("LightBindLayout"),
            entries: &[uniform_layout_entry(
                0,
                wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                true,
                mem::size_of::<LightUniform>(),
            )],
        });

        let buffer = Self::create_uniform(device, capacity);
        let bind_group = Self::create_bind_group(device, &bind_layout, &buffer);

        Self {
            buffer,
            capacity,
            bind_group,
            bind_layout,
            staging: Vec::new(),
        }
    }

    pub(crate) fn offset(index: usize) -> u32 {
        (index as u64 * LIGHT_UNIFORM_STRIDE) as u32
    }

    pub(crate) fn update(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, lights: &[LightUniform]) {
        let required = lights.len() as u32;
        if required > self.capacity {
            let new_capacity = required.max(self.capacity * 2);
            log::info!("Growing light buffer: {} -> {}", self.capacity, new_capacity);
            self.buffer = Self::create_uniform(device, new_capacity);
            self.bind_group = Self::create_bind_group(device, &self.bind_layout, &self.buffer);
            self.capacity = new_capacity;
        }

        if lights.is_empty() {
            return;
        }

        self.staging.clear();
        self.staging
            .resize(lights.len() * LIGHT_UNIFORM_STRIDE as usize, 0);
        for (index, light) in lights.iter().enumerate() {
            let start = index * LIGHT_UNIFORM_STRIDE as usize;
            let bytes = bytemuck::bytes_of(light);
            self.staging[start..start + bytes.len()].copy_from_slice(bytes);
        }
        queue.write_buffer(&self.buffer, 0, &self.staging);
    }

    fn create_uniform(device: &wgpu::Device, capacity: u32) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("LightUniformBuffer"),
            size: capacity as u64 * LIGHT_UNIFORM_STRIDE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        buffer: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("LightBindGroup"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer,
                    offset: 0,
                    size: NonZeroU64::new(mem::size_of::<LightUniform>() as u64),
                }),
            }],
        })
    }
}
