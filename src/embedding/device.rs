use candle_core::Device;
use tracing::{debug, info, warn};

use super::error::EmbeddingError;

/// GPU backends compiled into this build, in preference order.
fn compiled_backends() -> Vec<&'static str> {
    let mut backends = Vec::new();
    if cfg!(feature = "metal") {
        backends.push("metal");
    }
    if cfg!(feature = "cuda") {
        backends.push("cuda");
    }
    backends
}

fn open_backend(name: &str) -> candle_core::Result<Device> {
    match name {
        "metal" => Device::new_metal(0),
        "cuda" => Device::new_cuda(0),
        _ => Ok(Device::Cpu),
    }
}

/// Selects the encoder's compute device from the enabled features (falls back to CPU).
pub fn select_device() -> Result<Device, EmbeddingError> {
    let backends = compiled_backends();
    if backends.is_empty() {
        debug!("No GPU features enabled, using CPU");
        return Ok(Device::Cpu);
    }

    let mut failures: Vec<String> = Vec::with_capacity(backends.len());
    for backend in backends {
        match open_backend(backend) {
            Ok(device) => {
                info!(backend, "Using GPU acceleration");
                return Ok(device);
            }
            Err(e) => {
                warn!(backend, error = %e, "GPU device unavailable");
                failures.push(format!("{backend} failed: {e}"));
            }
        }
    }

    warn!(reason = %failures.join("; "), "Falling back to CPU device");
    Ok(Device::Cpu)
}

/// Short label for logs and the readiness report.
pub fn device_label(device: &Device) -> &'static str {
    match device {
        Device::Cpu => "cpu",
        Device::Cuda(_) => "cuda",
        Device::Metal(_) => "metal",
    }
}
