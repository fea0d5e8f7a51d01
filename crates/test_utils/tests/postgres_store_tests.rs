//! PostgreSQL store integration tests
//!
//! These start a Postgres container and are ignored by default:
//! `cargo test -p test_utils -- --ignored`

use std::sync::Arc;

use rust_decimal_macros::dec;
use tokio::task::JoinSet;

use domain_delivery::{DeliveryEngine, DeliveryError, DeliveryKey, DeliveryStore};
use test_utils::*;

async fn engine(db: &TestDatabase) -> DeliveryEngine {
    DeliveryEngine::new(Arc::new(db.store()), CatalogFixtures::standard())
}

async fn database() -> TestDatabase {
    create_isolated_test_database()
        .await
        .expect("Failed to create test database")
}

mod challan_tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_challan_round_trip_keeps_row_order() {
        let db = database().await;
        let engine = engine(&db).await;

        let request = TestChallanBuilder::new()
            .with_line("B", 7)
            .with_line("A", 5)
            .build();
        engine.registry.create(request).await.unwrap();

        let entry = engine
            .registry
            .fetch(&CodeFixtures::dc("DC001"))
            .await
            .unwrap();
        let items: Vec<_> = entry.rows.iter().map(|row| row.item.as_str()).collect();
        assert_eq!(items, vec!["B", "A"]);
        assert_boxes_eq(entry.rows[0].boxes, dec!(8.40));
        assert_boxes_eq(entry.planned_boxes(), dec!(18.40));
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_duplicate_challan_rejected() {
        let db = database().await;
        let engine = engine(&db).await;

        engine
            .registry
            .create(TestChallanBuilder::standard().build())
            .await
            .unwrap();
        let result = engine
            .registry
            .create(TestChallanBuilder::standard().build())
            .await;

        assert!(matches!(result, Err(DeliveryError::DuplicateEntry(dc)) if dc == "DC001"));
        assert_eq!(engine.registry.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_delete_row_removes_its_deliveries() {
        let db = database().await;
        let engine = engine(&db).await;
        engine
            .registry
            .create(TestChallanBuilder::standard().build())
            .await
            .unwrap();
        engine
            .ledger
            .record_delivery(TestDeliveryBuilder::new().with_boxes(dec!(3)).build())
            .await
            .unwrap();
        engine
            .ledger
            .record_delivery(TestDeliveryBuilder::new().with_item("B").with_boxes(dec!(2)).build())
            .await
            .unwrap();

        engine
            .registry
            .delete_row(&CodeFixtures::dc("DC001"), &CodeFixtures::item("A"))
            .await
            .unwrap();

        let remaining = engine
            .ledger
            .deliveries(&CodeFixtures::dc("DC001"))
            .await
            .unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].item.as_str(), "B");

        assert_not_found(
            engine
                .registry
                .delete_row(&CodeFixtures::dc("DC001"), &CodeFixtures::item("A"))
                .await,
        );
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_replan_below_delivered_rejected() {
        let db = database().await;
        let engine = engine(&db).await;
        engine
            .registry
            .create(TestChallanBuilder::standard().build())
            .await
            .unwrap();
        engine
            .ledger
            .record_delivery(TestDeliveryBuilder::new().with_boxes(dec!(6)).build())
            .await
            .unwrap();

        // 2 dozen of A is 4 boxes
        let result = engine
            .registry
            .update_row(&CodeFixtures::dc("DC001"), &CodeFixtures::item("A"), 2)
            .await;
        assert_over_delivery(result, dec!(6), dec!(4));

        let row = engine
            .registry
            .update_row(&CodeFixtures::dc("DC001"), &CodeFixtures::item("A"), 3)
            .await
            .unwrap();
        assert_boxes_eq(row.boxes, dec!(6));
    }
}

mod ledger_tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_ceiling_sequence() {
        let db = database().await;
        let engine = engine(&db).await;
        engine
            .registry
            .create(TestChallanBuilder::standard().build())
            .await
            .unwrap();

        engine
            .ledger
            .record_delivery(TestDeliveryBuilder::new().with_boxes(dec!(4)).build())
            .await
            .unwrap();
        let rejected = engine
            .ledger
            .record_delivery(TestDeliveryBuilder::new().with_boxes(dec!(7)).build())
            .await;
        assert_over_delivery(rejected, dec!(11), dec!(10));
        engine
            .ledger
            .record_delivery(TestDeliveryBuilder::new().with_boxes(dec!(6)).build())
            .await
            .unwrap();

        let status = engine
            .ledger
            .challan_status(&CodeFixtures::dc("DC001"))
            .await
            .unwrap();
        assert_within_plan(&status);
        assert!(status.items[0].is_complete());

        let pending = engine.ledger.pending_items().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].item.as_str(), "B");
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_unplanned_item_and_missing_challan() {
        let db = database().await;
        let engine = engine(&db).await;
        engine
            .registry
            .create(TestChallanBuilder::standard().build())
            .await
            .unwrap();

        let unplanned = engine
            .ledger
            .record_delivery(TestDeliveryBuilder::new().with_item("C").build())
            .await;
        assert!(matches!(unplanned, Err(DeliveryError::UnknownItem(_))));

        let missing = engine
            .ledger
            .record_delivery(TestDeliveryBuilder::new().with_dc_number("DC404").build())
            .await;
        assert_not_found(missing);
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_update_excludes_the_record_being_replaced() {
        let db = database().await;
        let engine = engine(&db).await;
        engine
            .registry
            .create(TestChallanBuilder::standard().build())
            .await
            .unwrap();
        engine
            .ledger
            .record_delivery(TestDeliveryBuilder::new().with_boxes(dec!(4)).build())
            .await
            .unwrap();
        engine
            .ledger
            .record_delivery(
                TestDeliveryBuilder::new()
                    .with_date(DateFixtures::jan(6))
                    .with_boxes(dec!(5))
                    .build(),
            )
            .await
            .unwrap();

        let key = DeliveryKey {
            dc_number: CodeFixtures::dc("DC001"),
            item: CodeFixtures::item("A"),
            date: DateFixtures::jan(5),
        };
        let updated = engine
            .ledger
            .update_delivery(&key, change_boxes(dec!(5)))
            .await
            .unwrap();
        assert_boxes_eq(updated.boxes, dec!(5));

        let rejected = engine
            .ledger
            .update_delivery(&key, change_boxes(dec!(5.01)))
            .await;
        assert_over_delivery(rejected, dec!(10.01), dec!(10));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    #[ignore = "requires Docker"]
    async fn test_concurrent_deliveries_never_overshoot() {
        let db = database().await;
        let engine = engine(&db).await;
        engine
            .registry
            .create(TestChallanBuilder::standard().build())
            .await
            .unwrap();

        let mut tasks = JoinSet::new();
        for _ in 0..25 {
            let engine = engine.clone();
            tasks.spawn(async move {
                engine
                    .ledger
                    .record_delivery(TestDeliveryBuilder::new().with_boxes(dec!(1)).build())
                    .await
            });
        }

        let mut accepted = 0;
        while let Some(result) = tasks.join_next().await {
            match result.unwrap() {
                Ok(_) => accepted += 1,
                Err(DeliveryError::OverDelivery { .. }) => {}
                Err(other) => panic!("unexpected error {other:?}"),
            }
        }

        assert_eq!(accepted, 10);
        let status = engine
            .ledger
            .challan_status(&CodeFixtures::dc("DC001"))
            .await
            .unwrap();
        assert_boxes_eq(status.items[0].delivered, dec!(10));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    #[ignore = "requires Docker"]
    async fn test_delete_row_counts_deliveries_racing_it() {
        let db = database().await;
        let engine = engine(&db).await;
        let store = db.store();
        engine
            .registry
            .create(TestChallanBuilder::standard().build())
            .await
            .unwrap();

        let mut tasks = JoinSet::new();
        for _ in 0..20 {
            let engine = engine.clone();
            tasks.spawn(async move {
                engine
                    .ledger
                    .record_delivery(TestDeliveryBuilder::new().with_boxes(dec!(0.5)).build())
                    .await
            });
        }
        let removed = store
            .delete_row(&CodeFixtures::dc("DC001"), &CodeFixtures::item("A"))
            .await
            .unwrap();

        // Each delivery either committed before the delete locked the row or
        // found the row gone afterwards
        let mut accepted = 0;
        while let Some(result) = tasks.join_next().await {
            match result.unwrap() {
                Ok(_) => accepted += 1,
                Err(DeliveryError::UnknownItem(_)) => {}
                Err(other) => panic!("unexpected error {other:?}"),
            }
        }
        assert_eq!(removed, accepted);
        assert!(engine.ledger.deliveries(&CodeFixtures::dc("DC001")).await.unwrap().is_empty());
    }
}

mod invoice_tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_invoice_is_a_live_view() {
        let db = database().await;
        let engine = engine(&db).await;
        engine
            .registry
            .create(TestChallanBuilder::new().with_line("C", 21).build())
            .await
            .unwrap();
        engine
            .ledger
            .record_delivery(TestDeliveryBuilder::new().with_item("C").with_boxes(dec!(10)).build())
            .await
            .unwrap();

        let number = CodeFixtures::invoice("INV-001");
        engine
            .aggregator
            .create_invoice(number.clone(), DateFixtures::jan(1), DateFixtures::jan(31))
            .await
            .unwrap();

        let statement = engine.aggregator.get_invoice(&number).await.unwrap();
        assert_eq!(statement.lines.len(), 1);
        assert_eq!(statement.lines[0].dozens, dec!(20.00));
        assert_eq!(statement.total.amount(), dec!(2000.00));
        assert_invoice_balanced(&statement);

        engine
            .ledger
            .record_delivery(
                TestDeliveryBuilder::new()
                    .with_item("C")
                    .with_date(DateFixtures::jan(20))
                    .with_boxes(dec!(0.5))
                    .build(),
            )
            .await
            .unwrap();

        let statement = engine.aggregator.get_invoice(&number).await.unwrap();
        assert_eq!(statement.lines.len(), 2);
        assert_eq!(statement.total.amount(), dec!(2100.00));
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_duplicate_invoice_and_listing_order() {
        let db = database().await;
        let engine = engine(&db).await;

        for number in ["INV-001", "INV-003", "INV-002"] {
            engine
                .aggregator
                .create_invoice(
                    CodeFixtures::invoice(number),
                    DateFixtures::jan(1),
                    DateFixtures::jan(31),
                )
                .await
                .unwrap();
        }
        let duplicate = engine
            .aggregator
            .create_invoice(
                CodeFixtures::invoice("INV-002"),
                DateFixtures::feb(1),
                DateFixtures::feb(2),
            )
            .await;
        assert!(matches!(duplicate, Err(DeliveryError::DuplicateInvoice(_))));

        let numbers: Vec<String> = engine
            .aggregator
            .list_invoices()
            .await
            .unwrap()
            .into_iter()
            .map(|binding| binding.number.to_string())
            .collect();
        assert_eq!(numbers, vec!["INV-003", "INV-002", "INV-001"]);
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_health_check_reports_healthy() {
        let db = database().await;
        let engine = engine(&db).await;
        assert!(engine.health_check().await.is_operational());
    }
}
