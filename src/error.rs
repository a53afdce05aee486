pub trait ResultLogExt<T, E> {
    /// Degrades an error to a log line, naming the operation that failed.
    fn ok_logged(self, what: &str) -> Option<T>;
}

impl<T, E> ResultLogExt<T, E> for std::result::Result<T, E>
where
    E: std::error::Error,
{
    fn ok_logged(self, what: &str) -> Option<T> {
        match self {
            Ok(ok) => Some(ok),
            Err(err) => {
                log::error!("{what}: {err}");
                None
            }
        }
    }
}
