#[suitest::suite(user_service_integration_tests)]
#[suitest::suite_cfg(sequential = true)]
mod user_service_integration_tests {
    use crate::{
        app::test::{TestState, TestStateConfig},
        core::service::{
            memory::RecordingOtpSender,
            user::dto::{SignIn, SignUp},
        },
        error::StowageErr,
    };
    use sqlx::PgPool;
    use suitest::{after_all, before_all};

    type UserService = crate::core::service::user::UserService<PgPool>;

    const TEST_UPLOAD_PATH: &str = "__user_service_test_upload__";

    #[before_all]
    async fn setup() -> (TestState, UserService, RecordingOtpSender) {
        let test_state = TestState::init(TestStateConfig {
            fs_store_path: TEST_UPLOAD_PATH.to_string(),
        })
        .await;

        let service = test_state.app.services.user.clone();
        let sender = test_state.sender.clone();

        (test_state, service, sender)
    }

    #[after_all]
    async fn teardown() {
        let _ = tokio::fs::remove_dir_all(TEST_UPLOAD_PATH).await;
    }

    #[test]
    async fn sign_up_verify_sign_out(service: UserService, sender: RecordingOtpSender) {
        let account_id = service
            .sign_up(SignUp {
                full_name: "Jane Doe".to_string(),
                email: "Jane@Stowage.test".to_string(),
            })
            .await
            .unwrap();

        let code = sender.last_code("jane@stowage.test").unwrap();

        let err = service.verify_otp(account_id, "not-it").await.unwrap_err();
        assert!(matches!(err.error, StowageErr::Unauthorized));

        let session = service.verify_otp(account_id, &code).await.unwrap();

        let user = service.current_user(&session.token).await.unwrap();
        assert_eq!(session.user_id, user.id);
        assert_eq!("jane@stowage.test", user.email);
        assert_eq!("https://avatars.test/JD", user.avatar);

        // Codes are single use
        let err = service.verify_otp(account_id, &code).await.unwrap_err();
        assert!(matches!(err.error, StowageErr::Unauthorized));

        service.sign_out(&session.token).await.unwrap();

        let err = service.current_user(&session.token).await.unwrap_err();
        assert!(matches!(err.error, StowageErr::Unauthorized));
    }

    #[test]
    async fn sign_in_existing_user(service: UserService, sender: RecordingOtpSender) {
        let err = service
            .sign_in(SignIn {
                email: "nobody@stowage.test".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err.error, StowageErr::DoesNotExist(_)));

        let account_id = service
            .sign_up(SignUp {
                full_name: "John Roe".to_string(),
                email: "john@stowage.test".to_string(),
            })
            .await
            .unwrap();

        let again = service
            .sign_in(SignIn {
                email: "john@stowage.test".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(account_id, again);

        let code = sender.last_code("john@stowage.test").unwrap();
        let session = service.verify_otp(account_id, &code).await.unwrap();
        assert!(service.current_user(&session.token).await.is_ok());
    }
}
