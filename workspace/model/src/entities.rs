//! SeaORM entity modules for the pizza ordering service.
//! Users own orders; every other table hangs off that one relation.

pub mod order;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::order::Entity as Order;
    pub use super::order::{OrderStatus, PizzaSize};
    pub use super::user::Entity as User;
}

#[cfg(test)]
mod test {
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{
        ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, DbErr,
        EntityTrait, ModelTrait, QueryFilter, Set,
    };

    use super::*;
    use prelude::*;

    async fn setup_db() -> Result<DatabaseConnection, DbErr> {
        let db = Database::connect("sqlite::memory:").await?;

        // Enable foreign keys
        db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;

        Migrator::up(&db, None).await.expect("Migrations failed.");
        Ok(db)
    }

    async fn create_user(db: &DatabaseConnection, username: &str) -> Result<user::Model, DbErr> {
        user::ActiveModel {
            username: Set(username.to_string()),
            email: Set(format!("{}@example.com", username)),
            password: Set("not-a-real-hash".to_string()),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    #[tokio::test]
    async fn test_user_orders_relation() -> Result<(), DbErr> {
        let db = setup_db().await?;

        let alice = create_user(&db, "alice").await?;
        let bob = create_user(&db, "bob").await?;

        assert!(!alice.is_staff);
        assert!(!alice.is_active);

        order::ActiveModel {
            quantity: Set(2),
            pizza_size: Set(PizzaSize::Large),
            order_status: Set(OrderStatus::Pending),
            user_id: Set(alice.id),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        order::ActiveModel {
            quantity: Set(1),
            pizza_size: Set(PizzaSize::Small),
            order_status: Set(OrderStatus::InTransit),
            user_id: Set(bob.id),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let alice_orders = alice.find_related(Order).all(&db).await?;
        assert_eq!(alice_orders.len(), 1);
        assert_eq!(alice_orders[0].pizza_size, PizzaSize::Large);
        assert!(alice_orders[0].is_pending());

        let bob_orders = bob.find_related(Order).all(&db).await?;
        assert_eq!(bob_orders.len(), 1);
        assert_eq!(bob_orders[0].order_status, OrderStatus::InTransit);
        assert!(!bob_orders[0].is_pending());

        let owner = bob_orders[0].find_related(User).one(&db).await?;
        assert_eq!(owner.map(|u| u.username), Some("bob".to_string()));

        let in_transit = Order::find()
            .filter(order::Column::OrderStatus.eq(OrderStatus::InTransit))
            .all(&db)
            .await?;
        assert_eq!(in_transit.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_username_and_email_are_unique() -> Result<(), DbErr> {
        let db = setup_db().await?;

        create_user(&db, "carol").await?;

        let same_username = user::ActiveModel {
            username: Set("carol".to_string()),
            email: Set("other@example.com".to_string()),
            password: Set("x".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await;
        assert!(same_username.is_err());

        let same_email = user::ActiveModel {
            username: Set("carol2".to_string()),
            email: Set("carol@example.com".to_string()),
            password: Set("x".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await;
        assert!(same_email.is_err());

        assert_eq!(User::find().all(&db).await?.len(), 1);
        Ok(())
    }

    #[test]
    fn test_enum_stored_values() {
        assert_eq!(stored_value(&OrderStatus::InTransit), "IN_TRANSIT");
        assert_eq!(stored_value(&PizzaSize::Medium), "MEDIUM");
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
        assert_eq!(PizzaSize::default(), PizzaSize::Small);
    }

    fn stored_value<T: sea_orm::ActiveEnum<Value = String>>(value: &T) -> String {
        value.to_value()
    }
}
