// booth-client/tests/accounts.rs
// Signup, login and my page through a session

mod common;

use std::sync::Arc;

use booth_client::{AccountError, ErrorCode, MyPage, SignupForm};
use booth_store::MemoryDatabase;
use common::{session_on, test_config};

#[tokio::test]
async fn test_signup_login_logout_round_trip() {
    let db = Arc::new(MemoryDatabase::new());
    let session = session_on(db, test_config(10, &[]));
    assert_eq!(session.my_page(), MyPage::LoginRequired);

    let account = session
        .signup(SignupForm::new("kim@school.ac.kr", "Kim", "20231234"))
        .await
        .unwrap();
    assert!(
        account
            .reserve_id
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
    );
    // signing up does not log in
    assert!(session.current_user().is_none());

    session.login(&account.reserve_id, "20231234").await.unwrap();
    assert_eq!(
        session.my_page(),
        MyPage::LoggedIn {
            reserve_id: account.reserve_id.clone(),
            greeting: "Kim (kim@school.ac.kr)".to_string(),
        }
    );

    session.logout();
    assert!(session.current_user().is_none());
    assert!(!session.my_page().is_logged_in());
}

#[tokio::test]
async fn test_login_failures_keep_session_logged_out() {
    let db = Arc::new(MemoryDatabase::new());
    let session = session_on(db, test_config(10, &[]));
    let account = session
        .signup(SignupForm::new("lee@school.ac.kr", "Lee", "20230001"))
        .await
        .unwrap();

    let err = session.login(&account.reserve_id, "20230002").await.unwrap_err();
    assert!(matches!(err, AccountError::StudentIdMismatch(_)));
    assert_eq!(err.code(), ErrorCode::InvalidCredentials);

    let err = session.login("NOSUCH01", "20230001").await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::AccountNotFound);
    assert_eq!(err.notice(), "Reserve id does not exist");

    assert!(session.current_user().is_none());
}

#[tokio::test]
async fn test_accounts_visible_to_other_sessions() {
    let db = Arc::new(MemoryDatabase::new());
    let first = session_on(db.clone(), test_config(10, &[]));
    let second = session_on(db, test_config(10, &[]));

    let account = first
        .signup(SignupForm::new("park@school.ac.kr", "Park", "20239999"))
        .await
        .unwrap();

    let user = second.login(&account.reserve_id, "20239999").await.unwrap();
    assert_eq!(user.name, "Park");
    assert!(first.current_user().is_none());
}
