pub mod store;
pub mod memory;
pub mod supabase;
pub mod search;
pub mod seed;

pub use store::DoctorStore;
pub use memory::InMemoryDoctorStore;
pub use supabase::SupabaseDoctorStore;
pub use search::DoctorSearchService;
