//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities back the household store: members, expenses with their shares,
//! recorded settlement payments, and chores.

pub mod chore;
pub mod expense;
pub mod expense_share;
pub mod member;
pub mod payment;

// Re-export specific types to avoid conflicts
pub use chore::{Column as ChoreColumn, Entity as Chore, Model as ChoreModel};
pub use expense::{Column as ExpenseColumn, Entity as Expense, Model as ExpenseModel};
pub use expense_share::{
    Column as ExpenseShareColumn, Entity as ExpenseShare, Model as ExpenseShareModel,
};
pub use member::{Column as MemberColumn, Entity as Member, Model as MemberModel};
pub use payment::{Column as PaymentColumn, Entity as Payment, Model as PaymentModel};
