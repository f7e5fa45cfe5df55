/// Creates an info-level span and enters it.
#[macro_export]
macro_rules! span {
    ($name:literal) => {
        tracing::info_span!($name).entered()
    };
}

/// Creates a debug-level span and enters it.
#[macro_export]
macro_rules! span_debug {
    ($name:literal) => {
        tracing::debug_span!($name).entered()
    };
}

#[cfg(test)]
mod tests {
    use tracing::Level;

    #[test]
    fn test_span_macros_enter_at_their_level() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .with_test_writer()
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let info = crate::span!("decode_stage");
            assert!(!info.is_disabled());
            assert_eq!(info.metadata().map(|m| *m.level()), Some(Level::INFO));
            assert_eq!(info.metadata().map(|m| m.name()), Some("decode_stage"));

            let debug = crate::span_debug!("invoke_stage");
            assert!(!debug.is_disabled());
            assert_eq!(debug.metadata().map(|m| *m.level()), Some(Level::DEBUG));
        });
    }
}
