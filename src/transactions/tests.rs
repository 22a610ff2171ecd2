//! Tests for transactions module

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::categories::models::CreateCategoryRequest;
    use crate::categories::CategoriesService;
    use crate::common::dates::{parse_date_input, DateRange};
    use crate::common::test_support::{insert_user, memory_pool};
    use crate::common::{ApiError, TransactionType, Validator};
    use rust_decimal::Decimal;
    use sqlx::SqlitePool;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn create_request(
        amount: &str,
        kind: TransactionType,
        date: &str,
        category_id: Option<&str>,
    ) -> models::CreateTransactionRequest {
        models::CreateTransactionRequest {
            amount: dec(amount),
            kind,
            description: None,
            date: Some(date.to_string()),
            category_id: category_id.map(str::to_string),
        }
    }

    async fn setup() -> (SqlitePool, TransactionsService, String) {
        let pool = memory_pool().await;
        insert_user(&pool, "U_ONE").await;
        insert_user(&pool, "U_TWO").await;
        let category = CategoriesService::new(pool.clone())
            .create(
                "U_ONE",
                CreateCategoryRequest {
                    name: "Groceries".to_string(),
                    kind: TransactionType::Expense,
                    icon: None,
                    color: None,
                },
            )
            .await
            .unwrap();
        (pool.clone(), TransactionsService::new(pool), category.id)
    }

    // ============================================================================
    // Validation
    // ============================================================================

    #[test]
    fn test_amount_must_be_positive() {
        let zero = create_request("0", TransactionType::Expense, "2026-02-01", None);
        assert!(!validators::CreateTransactionValidator.validate(&zero).is_valid);

        let negative = create_request("-5", TransactionType::Expense, "2026-02-01", None);
        assert!(!validators::CreateTransactionValidator.validate(&negative).is_valid);

        let ok = create_request("0.01", TransactionType::Expense, "2026-02-01", None);
        assert!(validators::CreateTransactionValidator.validate(&ok).is_valid);
    }

    #[test]
    fn test_amount_is_capped_to_money() {
        for amount in ["1000000000000000.01", "79228162514264337593543950335", "10.001"] {
            let request = create_request(amount, TransactionType::Income, "2026-02-01", None);
            let result = validators::CreateTransactionValidator.validate(&request);
            assert!(!result.is_valid, "{}", amount);
            assert_eq!(result.errors[0].field, "amount");
        }

        let largest = create_request("1000000000000000", TransactionType::Income, "2026-02-01", None);
        assert!(validators::CreateTransactionValidator.validate(&largest).is_valid);

        let update = models::UpdateTransactionRequest {
            amount: Some(Decimal::MAX),
            ..Default::default()
        };
        assert!(!validators::UpdateTransactionValidator.validate(&update).is_valid);
    }

    #[test]
    fn test_bad_date_fails_validation() {
        let request = create_request("10", TransactionType::Income, "next tuesday", None);
        let result = validators::CreateTransactionValidator.validate(&request);
        assert_eq!(result.errors[0].field, "date");
    }

    #[test]
    fn test_amount_accepts_number_or_string() {
        let json = serde_json::json!({ "amount": 12.5, "type": "EXPENSE" });
        let request: models::CreateTransactionRequest = serde_json::from_value(json).unwrap();
        assert_eq!(request.amount, dec("12.5"));

        let json = serde_json::json!({ "amount": "99.99", "type": "INCOME", "categoryId": "C_X" });
        let request: models::CreateTransactionRequest = serde_json::from_value(json).unwrap();
        assert_eq!(request.amount, dec("99.99"));
        assert_eq!(request.category_id.as_deref(), Some("C_X"));
    }

    #[test]
    fn test_query_defaults() {
        let filter = models::TransactionQuery::default().into_filter().unwrap();
        assert_eq!(filter.limit, 50);
        assert_eq!(filter.offset, 0);
        assert_eq!(filter.range, DateRange::default());
    }

    #[test]
    fn test_query_limit_bounds() {
        for limit in [0, 501, -1] {
            let query = models::TransactionQuery {
                limit: Some(limit),
                ..Default::default()
            };
            assert!(matches!(query.into_filter(), Err(ApiError::BadRequest(_))));
        }
        let query = models::TransactionQuery {
            offset: Some(-1),
            ..Default::default()
        };
        assert!(query.into_filter().is_err());
    }

    #[test]
    fn test_exact_date_overrides_range() {
        let query = models::TransactionQuery {
            date: Some("2026-02-10".to_string()),
            start_date: Some("2026-01-01".to_string()),
            end_date: Some("2026-12-31".to_string()),
            ..Default::default()
        };
        let filter = query.into_filter().unwrap();
        assert_eq!(
            filter.range.from,
            Some(parse_date_input("d", "2026-02-10T00:00:00.000Z").unwrap())
        );
        assert_eq!(
            filter.range.to,
            Some(parse_date_input("d", "2026-02-10T23:59:59.999Z").unwrap())
        );
    }

    #[test]
    fn test_chart_range_required_and_ordered() {
        let missing = models::DateRangeQuery {
            start_date: Some("2026-02-01".to_string()),
            end_date: None,
        };
        assert!(matches!(missing.required_range(), Err(ApiError::BadRequest(_))));

        let inverted = models::DateRangeQuery {
            start_date: Some("2026-02-10".to_string()),
            end_date: Some("2026-02-01".to_string()),
        };
        assert!(matches!(inverted.required_range(), Err(ApiError::BadRequest(_))));

        let same = models::DateRangeQuery {
            start_date: Some("2026-02-10".to_string()),
            end_date: Some("2026-02-10".to_string()),
        };
        assert!(same.required_range().is_ok());
    }

    #[test]
    fn test_chart_range_is_bounded() {
        let query = |start: &str, end: &str| models::DateRangeQuery {
            start_date: Some(start.to_string()),
            end_date: Some(end.to_string()),
        };

        let longest = query("2026-01-01", "2031-01-05");
        let (start, end) = longest.required_range().unwrap();
        assert_eq!((end - start).num_days(), validators::MAX_CHART_DAYS);

        let too_long = query("2026-01-01", "2031-01-06");
        assert!(matches!(too_long.required_range(), Err(ApiError::BadRequest(_))));

        let whole_calendar = query("0001-01-01", "9999-12-31");
        assert!(matches!(whole_calendar.required_range(), Err(ApiError::BadRequest(_))));

        // Only the chart is bounded; listing and summary take any range.
        assert!(whole_calendar.optional_range().is_ok());
    }

    // ============================================================================
    // Service
    // ============================================================================

    #[tokio::test]
    async fn test_create_embeds_category() {
        let (_pool, service, category_id) = setup().await;

        let transaction = service
            .create(
                "U_ONE",
                create_request("150.50", TransactionType::Expense, "2026-02-03", Some(&category_id)),
            )
            .await
            .unwrap();

        assert!(transaction.id.starts_with("T_"));
        assert_eq!(transaction.amount, dec("150.5"));
        assert_eq!(transaction.date, "2026-02-03T00:00:00.000Z");
        assert_eq!(
            transaction.category.as_ref().map(|c| c.name.as_str()),
            Some("Groceries")
        );

        let json = serde_json::to_value(&transaction).unwrap();
        assert_eq!(json["type"], "EXPENSE");
        assert_eq!(json["categoryId"], category_id.as_str());
        assert!(json["amount"].is_string());
    }

    #[tokio::test]
    async fn test_foreign_category_is_not_found() {
        let (_pool, service, category_id) = setup().await;

        let err = service
            .create(
                "U_TWO",
                create_request("10", TransactionType::Expense, "2026-02-03", Some(&category_id)),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_filters_and_pagination() {
        let (_pool, service, category_id) = setup().await;

        for (amount, kind, date) in [
            ("100", TransactionType::Income, "2026-02-01"),
            ("20", TransactionType::Expense, "2026-02-02"),
            ("30", TransactionType::Expense, "2026-02-10T15:00:00Z"),
            ("40", TransactionType::Expense, "2026-03-01"),
        ] {
            let category = (kind == TransactionType::Expense).then_some(category_id.as_str());
            service
                .create("U_ONE", create_request(amount, kind, date, category))
                .await
                .unwrap();
        }

        let all = models::TransactionQuery::default().into_filter().unwrap();
        let page = service.list("U_ONE", &all).await.unwrap();
        assert_eq!(page.total, 4);
        let dates: Vec<&str> = page.data.iter().map(|t| &t.date[..10]).collect();
        assert_eq!(dates, vec!["2026-03-01", "2026-02-10", "2026-02-02", "2026-02-01"]);

        let expenses_in_feb = models::TransactionQuery {
            kind: Some(TransactionType::Expense),
            start_date: Some("2026-02-01".to_string()),
            end_date: Some("2026-02-28".to_string()),
            ..Default::default()
        }
        .into_filter()
        .unwrap();
        let page = service.list("U_ONE", &expenses_in_feb).await.unwrap();
        assert_eq!(page.total, 2);

        let one_day = models::TransactionQuery {
            date: Some("2026-02-10".to_string()),
            ..Default::default()
        }
        .into_filter()
        .unwrap();
        let page = service.list("U_ONE", &one_day).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].amount, dec("30"));

        let paged = models::TransactionQuery {
            limit: Some(2),
            offset: Some(1),
            ..Default::default()
        }
        .into_filter()
        .unwrap();
        let page = service.list("U_ONE", &paged).await.unwrap();
        assert_eq!(page.total, 4);
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.limit, 2);
        assert_eq!(page.offset, 1);

        let other_user = service.list("U_TWO", &all).await.unwrap();
        assert_eq!(other_user.total, 0);
    }

    #[tokio::test]
    async fn test_summary_balance() {
        let (_pool, service, _) = setup().await;
        for (amount, kind) in [
            ("5000", TransactionType::Income),
            ("800", TransactionType::Income),
            ("150.25", TransactionType::Expense),
            ("49.75", TransactionType::Expense),
        ] {
            service
                .create("U_ONE", create_request(amount, kind, "2026-02-05", None))
                .await
                .unwrap();
        }

        let summary = service.summary("U_ONE", &DateRange::default()).await.unwrap();
        assert_eq!(summary.total_income, dec("5800"));
        assert_eq!(summary.total_expense, dec("200"));
        assert_eq!(summary.balance, dec("5600"));

        let before = DateRange {
            from: None,
            to: Some(parse_date_input("endDate", "2026-02-01").unwrap()),
        };
        let empty = service.summary("U_ONE", &before).await.unwrap();
        assert_eq!(empty.balance, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_chart_data_buckets() {
        let (_pool, service, _) = setup().await;
        for (amount, kind, date) in [
            ("5000", TransactionType::Income, "2026-02-01"),
            ("150", TransactionType::Expense, "2026-02-03"),
            ("85", TransactionType::Expense, "2026-02-10"),
            ("120", TransactionType::Expense, "2026-02-17"),
        ] {
            service
                .create("U_ONE", create_request(amount, kind, date, None))
                .await
                .unwrap();
        }

        let start = parse_date_input("startDate", "2026-02-01").unwrap();
        let end = parse_date_input("endDate", "2026-02-28").unwrap();
        let points = service.chart_data("U_ONE", start, end).await.unwrap();

        let names: Vec<&str> = points.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Week 1", "Week 2", "Week 3", "Week 4"]);
        assert_eq!(points[0].income, dec("5000"));
        assert_eq!(points[0].expense, dec("150"));
        assert_eq!(points[1].expense, dec("85"));
        assert_eq!(points[2].expense, dec("120"));
        assert_eq!(points[3].expense, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let (_pool, service, category_id) = setup().await;
        let created = service
            .create("U_ONE", create_request("10", TransactionType::Expense, "2026-02-03", None))
            .await
            .unwrap();

        let updated = service
            .update(
                "U_ONE",
                &created.id,
                models::UpdateTransactionRequest {
                    amount: Some(dec("12.5")),
                    category_id: Some(Some(category_id.clone())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.amount, dec("12.5"));
        assert_eq!(updated.kind, TransactionType::Expense);
        assert_eq!(updated.category_id.as_deref(), Some(category_id.as_str()));
        assert!(updated.category.is_some());

        assert!(matches!(
            service.delete("U_TWO", &created.id).await.unwrap_err(),
            ApiError::NotFound(_)
        ));
        let deleted = service.delete("U_ONE", &created.id).await.unwrap();
        assert_eq!(deleted.id, created.id);
        assert!(service.get("U_ONE", &created.id).await.is_err());
    }

    #[tokio::test]
    async fn test_update_can_clear_category_and_description() {
        let (_pool, service, category_id) = setup().await;
        let created = service
            .create(
                "U_ONE",
                models::CreateTransactionRequest {
                    description: Some("Groceries run".to_string()),
                    ..create_request("10", TransactionType::Expense, "2026-02-03", Some(&category_id))
                },
            )
            .await
            .unwrap();

        // Absent fields are untouched.
        let unchanged = service
            .update(
                "U_ONE",
                &created.id,
                models::UpdateTransactionRequest {
                    amount: Some(dec("11")),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(unchanged.description.as_deref(), Some("Groceries run"));
        assert_eq!(unchanged.category_id.as_deref(), Some(category_id.as_str()));

        let cleared = service
            .update(
                "U_ONE",
                &created.id,
                models::UpdateTransactionRequest {
                    description: Some(None),
                    category_id: Some(Some(String::new())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(cleared.description.is_none());
        assert!(cleared.category_id.is_none());
        assert!(cleared.category.is_none());
        assert_eq!(cleared.amount, dec("11"));

        let stored = service.get("U_ONE", &created.id).await.unwrap();
        assert!(stored.description.is_none());
        assert!(stored.category_id.is_none());
    }

    #[test]
    fn test_update_request_distinguishes_null_from_absent() {
        let absent: models::UpdateTransactionRequest =
            serde_json::from_value(serde_json::json!({ "amount": "5" })).unwrap();
        assert!(absent.category_id.is_none());
        assert!(absent.description.is_none());

        let cleared: models::UpdateTransactionRequest =
            serde_json::from_value(serde_json::json!({ "categoryId": null, "description": null }))
                .unwrap();
        assert_eq!(cleared.category_id, Some(None));
        assert_eq!(cleared.description, Some(None));

        // Untouched fields stay out of the client's PATCH body.
        let body = serde_json::to_value(models::UpdateTransactionRequest {
            category_id: Some(None),
            ..Default::default()
        })
        .unwrap();
        assert!(body.get("description").is_none());
        assert!(body["categoryId"].is_null());
        assert!(body.as_object().unwrap().contains_key("categoryId"));
    }

    #[tokio::test]
    async fn test_deleting_category_keeps_transaction() {
        let (pool, service, category_id) = setup().await;
        let created = service
            .create(
                "U_ONE",
                create_request("10", TransactionType::Expense, "2026-02-03", Some(&category_id)),
            )
            .await
            .unwrap();

        CategoriesService::new(pool)
            .delete("U_ONE", &category_id)
            .await
            .unwrap();

        let transaction = service.get("U_ONE", &created.id).await.unwrap();
        assert!(transaction.category_id.is_none());
        assert!(transaction.category.is_none());
    }
}
