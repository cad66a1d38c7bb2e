//! Concrete model endpoint adapters.

#[cfg(feature = "provider-openai")]
pub mod openai;
