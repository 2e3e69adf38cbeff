pub mod claims;
pub mod jwt;
pub mod session;
pub mod token_store;
pub mod utils;

pub use claims::TokenPayload;
pub use jwt::decode_payload;
pub use session::{Session, SessionState};
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore, TOKEN_KEY, USER_KEY};
pub use utils::{require_role, require_student, require_teacher, require_user};
