use burn::backend::{ndarray::NdArrayDevice, wgpu::WgpuDevice, NdArray, Wgpu};
use burn::tensor::{backend::Backend, Tensor};

/// Capability query for where the encoder should run.
pub trait DeviceProbe<B: Backend> {
    /// An accelerator device, if one can be used.
    fn accelerator(&self) -> Option<B::Device>;

    fn cpu(&self) -> B::Device;

    /// Prefer the accelerator, falling back to the CPU.
    fn select(&self) -> B::Device {
        match self.accelerator() {
            Some(device) => {
                log::info!("📱 Using device: {:?}", device);
                device
            }
            None => {
                let device = self.cpu();
                log::warn!("⚠️  No accelerator available, using CPU device {:?}", device);
                device
            }
        }
    }
}

/// Wgpu backend: the default adapter when it responds, otherwise the CPU adapter.
#[derive(Debug, Clone, Copy)]
pub struct WgpuProbe {
    pub force_cpu: bool,
    /// Reports whether a device can actually run work.
    pub adapter_check: fn(&WgpuDevice) -> bool,
}

impl Default for WgpuProbe {
    fn default() -> Self {
        Self {
            force_cpu: false,
            adapter_check: adapter_responds,
        }
    }
}

impl DeviceProbe<Wgpu> for WgpuProbe {
    fn accelerator(&self) -> Option<WgpuDevice> {
        if self.force_cpu {
            return None;
        }
        let device = WgpuDevice::default();
        if (self.adapter_check)(&device) {
            Some(device)
        } else {
            None
        }
    }

    fn cpu(&self) -> WgpuDevice {
        WgpuDevice::Cpu
    }
}

/// Allocate and read back a one-element tensor on `device`.
///
/// The wgpu runtime panics during client setup when no adapter matches, so
/// the panic is caught and treated as "not available".
pub fn adapter_responds(device: &WgpuDevice) -> bool {
    let device = device.clone();
    let probe = std::panic::catch_unwind(move || {
        Tensor::<Wgpu, 1>::zeros([1], &device)
            .into_data()
            .to_vec::<f32>()
            .is_ok()
    });
    match probe {
        Ok(ready) => ready,
        Err(_) => {
            log::debug!("wgpu adapter setup failed");
            false
        }
    }
}

/// NdArray backend, which only ever runs on the CPU.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuProbe;

impl DeviceProbe<NdArray> for CpuProbe {
    fn accelerator(&self) -> Option<NdArrayDevice> {
        None
    }

    fn cpu(&self) -> NdArrayDevice {
        NdArrayDevice::Cpu
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_probe_always_falls_back() {
        assert_eq!(CpuProbe.select(), NdArrayDevice::Cpu);
    }

    #[test]
    fn forced_wgpu_probe_selects_cpu_adapter() {
        let probe = WgpuProbe {
            force_cpu: true,
            ..WgpuProbe::default()
        };
        assert!(probe.accelerator().is_none());
        assert_eq!(probe.select(), WgpuDevice::Cpu);
    }

    #[test]
    fn wgpu_probe_falls_back_when_adapter_is_missing() {
        let probe = WgpuProbe {
            force_cpu: false,
            adapter_check: |_| false,
        };
        assert!(probe.accelerator().is_none());
        assert_eq!(probe.select(), WgpuDevice::Cpu);
    }

    #[test]
    fn wgpu_probe_keeps_responding_adapter() {
        let probe = WgpuProbe {
            force_cpu: false,
            adapter_check: |_| true,
        };
        assert_eq!(probe.select(), WgpuDevice::default());
    }

    /// A backend-agnostic probe driven only by the trait's default `select`.
    struct FixedProbe(Option<NdArrayDevice>);

    impl DeviceProbe<NdArray> for FixedProbe {
        fn accelerator(&self) -> Option<NdArrayDevice> {
            self.0.clone()
        }

        fn cpu(&self) -> NdArrayDevice {
            NdArrayDevice::Cpu
        }
    }

    #[test]
    fn select_prefers_accelerator_and_falls_back_to_cpu() {
        assert_eq!(FixedProbe(None).select(), NdArrayDevice::Cpu);
        assert_eq!(FixedProbe(Some(NdArrayDevice::Cpu)).select(), NdArrayDevice::Cpu);
    }
}
