pub mod password;
pub mod store;
pub mod supabase;

pub use password::PasswordService;
pub use store::{CredentialStore, InMemoryCredentialStore};
pub use supabase::SupabaseCredentialStore;
