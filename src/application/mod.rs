pub mod composer;
pub mod dto;
pub mod ports;
pub mod pose_extractor;
pub mod services;

#[cfg(test)]
pub(crate) mod test_support;
