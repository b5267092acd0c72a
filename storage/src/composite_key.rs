//! # Composite keys
//!
//! Structured keys formed by a namespace followed by an ordered list of parts. Every component
//! is terminated by a `0x00` delimiter, so the encoding of a namespace plus its first `n` parts
//! is a prefix of the encoding of any key that extends it. This is what allows iterating over
//! all the keys that share a partial composite key.
//!
//! ```text
//! 0x00 namespace 0x00 part_1 0x00 part_2 0x00 ... part_n 0x00
//! ```
use thiserror::Error;

const DELIMITER: u8 = 0x00;

/// Errors when building or splitting a composite key
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompositeKeyError {
    /// A namespace or part contains the delimiter byte
    #[error("composite key component {0:?} contains the 0x00 delimiter")]
    DelimiterInComponent(String),
    /// The namespace of a composite key can not be empty
    #[error("composite key namespace can not be empty")]
    EmptyNamespace,
    /// The key does not follow the composite key layout
    #[error("malformed composite key: {0}")]
    Malformed(String),
}

fn validate(component: &str) -> Result<(), CompositeKeyError> {
    if component.as_bytes().contains(&DELIMITER) {
        Err(CompositeKeyError::DelimiterInComponent(component.to_string()))
    } else {
        Ok(())
    }
}

/// Encode a namespace and its parts into a composite key.
///
/// Passing only a leading subset of the parts yields the prefix shared by every key that extends
/// those parts.
pub fn encode<S: AsRef<str>>(namespace: &str, parts: &[S]) -> Result<Vec<u8>, CompositeKeyError> {
    if namespace.is_empty() {
        return Err(CompositeKeyError::EmptyNamespace);
    }
    validate(namespace)?;

    let mut key = Vec::with_capacity(
        2 + namespace.len() + parts.iter().map(|p| p.as_ref().len() + 1).sum::<usize>(),
    );
    key.push(DELIMITER);
    key.extend_from_slice(namespace.as_bytes());
    key.push(DELIMITER);

    for part in parts {
        let part = part.as_ref();
        validate(part)?;
        key.extend_from_slice(part.as_bytes());
        key.push(DELIMITER);
    }

    Ok(key)
}

/// Split a composite key into its namespace and parts
pub fn decode(key: &[u8]) -> Result<(String, Vec<String>), CompositeKeyError> {
    let malformed = |msg: &str| CompositeKeyError::Malformed(msg.to_string());

    let body = key
        .strip_prefix(&[DELIMITER])
        .ok_or_else(|| malformed("missing leading delimiter"))?;
    let body = body
        .strip_suffix(&[DELIMITER])
        .ok_or_else(|| malformed("missing trailing delimiter"))?;

    let mut components = body.split(|b| *b == DELIMITER).map(|component| {
        String::from_utf8(component.to_vec()).map_err(|_| malformed("component is not UTF-8"))
    });

    let namespace = components
        .next()
        .ok_or_else(|| malformed("missing namespace"))??;
    if namespace.is_empty() {
        return Err(CompositeKeyError::EmptyNamespace);
    }
    let parts = components.collect::<Result<Vec<_>, _>>()?;

    Ok((namespace, parts))
}
