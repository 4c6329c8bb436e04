// Bundle assembly - frames the plugin into a single W.loadPlugin() script

pub mod assembler;

pub use assembler::{BundleAssembler, REGISTER_CALL};
