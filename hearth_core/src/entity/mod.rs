// SeaORM entities for the board tables created by `models::migrator`.

pub mod notification;
pub mod post;
pub mod reply;
pub mod user;
pub mod verification_code;


pub mod prelude {
    pub use super::notification::{
        ActiveModel as NotificationActiveModel, Column as NotificationColumn,
        Entity as Notification, Model as NotificationModel,
    };
    pub use super::post::{
        ActiveModel as PostActiveModel, Column as PostColumn, Entity as Post, Model as PostModel,
    };
    pub use super::reply::{
        ActiveModel as ReplyActiveModel, Column as ReplyColumn, Entity as Reply,
        Model as ReplyModel,
    };
    pub use super::user::{
        ActiveModel as UserActiveModel, Column as UserColumn, Entity as User, Model as UserModel,
    };
    pub use super::verification_code::{
        ActiveModel as VerificationCodeActiveModel, Column as VerificationCodeColumn,
        Entity as VerificationCode, Model as VerificationCodeModel,
    };

    pub use sea_orm::{
        ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, DbErr,
        EntityTrait, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
        TransactionTrait,
    };
}
