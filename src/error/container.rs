use std::fmt::Formatter;

use thiserror::Error;

/// An error that is localised to a particular address in the modelled
/// program's memory or code.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub struct Located<E>
where
    E: Clone,
{
    /// The 64-bit machine address at which the error occurred.
    pub location: u64,

    /// The error data.
    pub payload: E,
}

/// Displays the error associated with the hexadecimal-encoded machine
/// address at which the error occurred.
impl<E> std::fmt::Display for Located<E>
where
    E: std::fmt::Display + Clone,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[0x{}]: {}",
            hex::encode(self.location.to_be_bytes()),
            self.payload
        )
    }
}

/// A trait for types that can have a machine address attached to them.
pub trait Locatable
where
    Self: Sized,
{
    /// The return type with the attached address.
    type Located;

    /// Attach the machine `address` to the error.
    fn locate(self, address: u64) -> Self::Located;
}

/// A blanket implementation that allows for attaching an address to any
/// result.
impl<T, E> Locatable for Result<T, E>
where
    E: std::error::Error + Clone,
{
    type Located = Result<T, Located<E>>;

    fn locate(self, address: u64) -> Self::Located {
        self.map_err(|e| Located {
            location: address,
            payload: e,
        })
    }
}
