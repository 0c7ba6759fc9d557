//! Backend selection
//!
//! Training runs on the NdArray CPU backend by default so the crate works
//! everywhere; the `cuda-jit` feature switches everything to the GPU backend.

use burn::backend::Autodiff;
use burn::record::{BinFileRecorder, FullPrecisionSettings};

#[cfg(feature = "cuda-jit")]
pub type DefaultBackend = burn::backend::CudaJit;

#[cfg(not(feature = "cuda-jit"))]
pub type DefaultBackend = burn::backend::NdArray;

/// The autodiff backend used for training
pub type TrainingBackend = Autodiff<DefaultBackend>;

/// Recorder used for all model artifacts
///
/// Full precision, so saved weights reproduce predictions exactly after a
/// load.
pub type ModelRecorder = BinFileRecorder<FullPrecisionSettings>;

/// Get the default device for the selected backend
pub fn default_device() -> <DefaultBackend as burn::tensor::backend::Backend>::Device {
    Default::default()
}

/// Human-readable name of the active backend
pub fn backend_name() -> &'static str {
    #[cfg(feature = "cuda-jit")]
    {
        "CUDA (GPU)"
    }
    #[cfg(not(feature = "cuda-jit"))]
    {
        "NdArray (CPU)"
    }
}
