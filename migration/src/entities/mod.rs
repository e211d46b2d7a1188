pub mod access_token;
pub mod search_history;
pub mod user;

pub use access_token::Entity as AccessTokenEntity;
pub use search_history::Entity as SearchHistoryEntity;
pub use user::Entity as UserEntity;
