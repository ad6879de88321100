pub mod inbound;

pub use inbound::RecordLifecycleApi;
