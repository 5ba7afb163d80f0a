//! Database-backed review workflow tests

#[cfg(test)]
mod tests {
    use sqlx::PgPool;
    use uuid::Uuid;

    use creditsea_server::lifecycle::{ApplicationStatus, LoanAction};
    use creditsea_server::loans::{EmploymentStatus, LoanError, LoanService, SubmitLoanRequest};
    use creditsea_server::models::Role;

    /// Helper to create a test database pool
    async fn setup_test_db() -> PgPool {
        let database_url = std::env::var("TEST_DATABASE_URL")
            .unwrap_or_else(|_| "postgresql://localhost/creditsea_test".to_string());

        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(4)
            .connect(&database_url)
            .await
            .expect("Failed to connect to test database");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        pool
    }

    async fn insert_user(pool: &PgPool, role: Role) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, role, created_at, updated_at)
            VALUES ($1, $2, $3, 'irrelevant', $4, now(), now())
            "#,
        )
        .bind(id)
        .bind(format!("user-{id}"))
        .bind(format!("{id}@example.com"))
        .bind(role)
        .execute(pool)
        .await
        .expect("Failed to insert user");
        id
    }

    fn submit_request() -> SubmitLoanRequest {
        SubmitLoanRequest {
            full_name: "Jane Doe".to_string(),
            loan_amount: 5000,
            loan_tenure_months: 12,
            loan_reason: "working capital".to_string(),
            employment_status: EmploymentStatus::Employed,
            employment_address: "12 Market Street".to_string(),
            terms_accepted: true,
            privacy_accepted: true,
        }
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_concurrent_verifies_exactly_one_wins() {
        let pool = setup_test_db().await;
        let service = LoanService::new(pool.clone());

        let borrower = insert_user(&pool, Role::Borrower).await;
        let first_verifier = insert_user(&pool, Role::Verifier).await;
        let second_verifier = insert_user(&pool, Role::Verifier).await;

        let application = service
            .submit_application(borrower, submit_request())
            .await
            .expect("Submission should succeed");

        let (first, second) = tokio::join!(
            service.transition(
                &application.id,
                LoanAction::Verify,
                first_verifier,
                Role::Verifier,
                None,
            ),
            service.transition(
                &application.id,
                LoanAction::Verify,
                second_verifier,
                Role::Verifier,
                None,
            ),
        );

        let wins = [first.is_ok(), second.is_ok()]
            .iter()
            .filter(|won| **won)
            .count();
        assert_eq!(wins, 1, "exactly one concurrent verify must win");

        // The loser either lost the conditional UPDATE (stale view) or
        // re-read the already-moved status; both are non-retryable-as-is.
        let loser = if first.is_err() { first } else { second };
        assert!(matches!(
            loser.unwrap_err(),
            LoanError::Conflict | LoanError::Lifecycle(_)
        ));

        let current = service
            .get_application(&application.id, first_verifier, Role::Verifier)
            .await
            .expect("Application should still exist");
        assert_eq!(current.status, ApplicationStatus::UnderReview);
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_transition_stamps_actor_and_reason() {
        let pool = setup_test_db().await;
        let service = LoanService::new(pool.clone());

        let borrower = insert_user(&pool, Role::Borrower).await;
        let admin = insert_user(&pool, Role::Admin).await;

        let application = service
            .submit_application(borrower, submit_request())
            .await
            .expect("Submission should succeed");

        let rejected = service
            .transition(
                &application.id,
                LoanAction::Reject,
                admin,
                Role::Admin,
                Some("  income below threshold  "),
            )
            .await
            .expect("Rejection should succeed");

        assert_eq!(rejected.status, ApplicationStatus::Rejected);
        assert_eq!(rejected.last_action_by, Some(admin));
        assert_eq!(
            rejected.rejection_reason.as_deref(),
            Some("income below threshold")
        );
        assert!(rejected.updated_at > application.updated_at);
    }
}
