//! DOM Exceptions
//!
//! Closed taxonomy of DOM errors. Every failing operation leaves the
//! tree exactly as it was before the call.

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors, one variant per DOMException name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// Insertion or replacement would break a tree-shape constraint
    #[error("HierarchyRequestError: {0}")]
    HierarchyRequest(&'static str),

    /// The referenced node is not where the caller said it is
    #[error("NotFoundError: {0}")]
    NotFound(&'static str),

    /// The attribute is already owned by another element
    #[error("InUseAttributeError: the attribute is in use by another element")]
    InUseAttribute,

    /// Malformed namespace, prefix or qualified-name combination
    #[error("NamespaceError: {0}")]
    Namespace(&'static str),

    /// A name or data string fails the XML production it must match
    #[error("InvalidCharacterError: {0}")]
    InvalidCharacter(&'static str),

    /// Character offset or count out of range
    #[error("IndexSizeError: offset is greater than the node's length")]
    IndexSize,

    /// Serialization failed; the well-formedness violation is the source
    #[error("InvalidStateError: the node could not be serialized")]
    InvalidState {
        #[source]
        cause: Option<WellFormedError>,
    },

    /// The operation is intentionally not implemented
    #[error("NotSupportedError: {0}")]
    NotSupported(&'static str),

    /// A range boundary cannot be placed in this kind of node
    #[error("InvalidNodeTypeError: {0}")]
    InvalidNodeType(&'static str),
}

impl DomError {
    /// The DOMException name for this error
    pub fn name(&self) -> &'static str {
        match self {
            Self::HierarchyRequest(_) => "HierarchyRequestError",
            Self::NotFound(_) => "NotFoundError",
            Self::InUseAttribute => "InUseAttributeError",
            Self::Namespace(_) => "NamespaceError",
            Self::InvalidCharacter(_) => "InvalidCharacterError",
            Self::IndexSize => "IndexSizeError",
            Self::InvalidState { .. } => "InvalidStateError",
            Self::NotSupported(_) => "NotSupportedError",
            Self::InvalidNodeType(_) => "InvalidNodeTypeError",
        }
    }
}

impl From<WellFormedError> for DomError {
    fn from(cause: WellFormedError) -> Self {
        Self::InvalidState { cause: Some(cause) }
    }
}

/// Well-formedness violations detected while serializing
///
/// These never escape the serializer directly: the public entry points
/// re-signal them as [`DomError::InvalidState`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WellFormedError {
    #[error("element local name `{0}` is not a valid XML name")]
    ElementName(String),

    #[error("attribute local name `{0}` is not a valid XML name")]
    AttributeName(String),

    #[error("duplicate attribute {{{namespace}}}{local_name}")]
    DuplicateAttribute { namespace: String, local_name: String },

    #[error("the `xmlns` prefix cannot be bound to an element")]
    XmlnsElementPrefix,

    #[error("the XMLNS namespace cannot be declared")]
    XmlnsNamespaceDeclared,

    #[error("a namespace declaration cannot be empty")]
    EmptyNamespaceDeclaration,

    #[error("document has no document element")]
    MissingDocumentElement,

    #[error("text data contains characters outside the Char production")]
    TextData,

    #[error("comment data is not well-formed")]
    CommentData,

    #[error("processing instruction target `{0}` is not allowed")]
    PiTarget(String),

    #[error("processing instruction data is not well-formed")]
    PiData,

    #[error("CDATA section data contains `]]>`")]
    CDataData,

    #[error("doctype public identifier contains non-PubidChar characters")]
    DoctypePublicId,

    #[error("doctype system identifier is not well-formed")]
    DoctypeSystemId,

    #[error("attribute value contains characters outside the Char production")]
    AttributeValue,
}
