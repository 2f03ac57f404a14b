#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

pub use smartlb_controller_core as core;
pub use smartlb_controller_k8s_api as k8s;
pub use smartlb_controller_k8s_index as index;
pub use smartlb_controller_publish as publish;

mod args;

pub use self::args::Args;
