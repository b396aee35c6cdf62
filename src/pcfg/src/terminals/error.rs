use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum MaskError {
    #[error("Generator mask is empty")]
    EmptyMask,

    #[error("Generator mask byte {byte:#04x} at position {position} is not printable ASCII")]
    InvalidMaskByte{byte: u8, position: usize},
}
