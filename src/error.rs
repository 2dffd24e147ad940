use std::fmt;

#[derive(Debug, Clone, PartialEq)]
/**
 * Represents an error that can occur while building, traversing, or evaluating
 * an expression graph.
 */
pub enum Error {
    /**
     * A traversal started from a root that is reachable via a back-edge.
     */
    Cycle,

    /**
     * An `Apply` node was invoked directly as a callable rather than through
     * [`evaluate`](crate::evaluate).
     */
    CalledDeferredNode,

    /**
     * [`evaluate`](crate::evaluate) reached a variable node whose name has no
     * entry in the supplied bindings.
     */
    UnboundVariable(String),

    /**
     * The param binder found two argument sources (positional and keyword, or
     * two keywords) bound to the same parameter name.
     */
    DuplicateArgument(String),

    /**
     * The param binder found a keyword argument that matches neither a
     * declared parameter nor a variadic-keyword slot.
     */
    UnrecognizedKeyword(String),

    /**
     * The param binder found more positional arguments than the callable's
     * signature declares, and the callable has no variadic-positional slot.
     */
    TooManyPositional,

    /**
     * Internal invariant violation: an active-path stack was popped while
     * empty. Should be unreachable.
     */
    EmptyStackPop,

    /**
     * Internal invariant violation: the active-path unwind never found the
     * expected parent on the stack. Should be unreachable.
     */
    SentinelNotFound,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Cycle => write!(f, "graph contains a directed cycle"),
            Error::CalledDeferredNode => {
                write!(f, "called a deferred Apply node directly; use evaluate() instead")
            }
            Error::UnboundVariable(name) => write!(f, "variable '{}' is not bound", name),
            Error::DuplicateArgument(name) => {
                write!(f, "duplicate argument for parameter '{}'", name)
            }
            Error::UnrecognizedKeyword(name) => {
                write!(f, "unrecognized keyword argument '{}'", name)
            }
            Error::TooManyPositional => {
                write!(f, "too many positional arguments for callable")
            }
            Error::EmptyStackPop => write!(f, "internal error: popped an empty stack"),
            Error::SentinelNotFound => {
                write!(f, "internal error: sentinel not found while unwinding active path")
            }
        }
    }
}

impl std::error::Error for Error {}

/**
 * Wrapper around [`Result`](std::result::Result) with this crate's error type.
 */
pub type Result<T> = std::result::Result<T, Error>;
