//! Error conversion implementations.
//!
//! This module contains From trait implementations to convert from internal
//! error types to the unified Error type.

use super::types::Error;
use crate::ooxml::error::OoxmlError;
use crate::ooxml::opc::error::OpcError;

impl From<OpcError> for Error {
    fn from(err: OpcError) -> Self {
        Error::from_opc_error(err)
    }
}

impl From<OoxmlError> for Error {
    fn from(err: OoxmlError) -> Self {
        match err {
            OoxmlError::Io(e) => Error::Io(e),
            OoxmlError::Xml(s) => Error::XmlError(s),
            OoxmlError::PartNotFound(s) => Error::ComponentNotFound(s),
            OoxmlError::InvalidPart { part, reason } => Error::InvalidPart { part, reason },
            OoxmlError::InvalidContentType { expected, got } => {
                Error::InvalidContentType { expected, got }
            },
            OoxmlError::Opc(e) => Error::from_opc_error(e),
        }
    }
}

impl Error {
    pub(crate) fn from_opc_error(err: OpcError) -> Self {
        match err {
            OpcError::IoError(e) => Error::Io(e),
            OpcError::ZipError(e) => Error::ZipError(e.to_string()),
            OpcError::XmlError(s) => Error::XmlError(s),
            OpcError::PartNotFound(s) => Error::ComponentNotFound(s),
            _ => Error::Other(err.to_string()),
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlError(err.to_string())
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ZipError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_part_maps_to_component_not_found() {
        let err: Error = OoxmlError::PartNotFound("/word/document.xml".to_string()).into();
        assert!(matches!(err, Error::ComponentNotFound(ref p) if p == "/word/document.xml"));
        assert_eq!(err.to_string(), "Component not found: /word/document.xml");
    }

    #[test]
    fn test_invalid_part_keeps_context() {
        let err: Error = OoxmlError::InvalidPart {
            part: "/word/header1.xml".to_string(),
            reason: "not valid UTF-8".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Invalid part /word/header1.xml: not valid UTF-8");
    }

    #[test]
    fn test_opc_error_passthrough() {
        let err: Error = OpcError::XmlError("Rels parse error".to_string()).into();
        assert!(matches!(err, Error::XmlError(_)));
    }
}
