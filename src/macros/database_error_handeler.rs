/// unwrap a store result, logging every error except `NotFound` before
/// returning it to the caller.
macro_rules! db_handle_get_error {
    ( $data:expr, $target:expr, $type_str:expr) => {
        match $data {
            Ok(e) => e,
            Err(diesel::result::Error::NotFound) => {
                return Err(diesel::result::Error::NotFound.into());
            }
            Err(error) => {
                error!(target:$target, "Error getting {}. (error: {})", $type_str, error);
                return Err(error.into());
            }
        }
    }
}

pub(crate) use db_handle_get_error;
