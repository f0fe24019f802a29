use quillpost::models::{CreatePost, NewContact, UpdatePost};
use quillpost::services::{auth, contact, media, password_reset, posts, slug, ServiceError};
use quillpost::Database;

fn create_test_db() -> Database {
    use rand::Rng;
    let id: u64 = rand::thread_rng().gen();
    let path = std::env::temp_dir().join(format!("quillpost_test_{}.db", id));

    let db = Database::open(path.to_str().unwrap()).expect("Failed to create test database");
    db.migrate().expect("Failed to run migrations");
    db
}

// Valid test passwords meet the policy: 8+ chars, uppercase, lowercase, number
const TEST_PASSWORD: &str = "Password123";
const WRONG_PASSWORD: &str = "WrongPass456";
const NEW_PASSWORD: &str = "NewPass456";

fn create_author(db: &Database, email: &str) -> i64 {
    auth::register_user(db, "Test Author", email, TEST_PASSWORD)
        .expect("Failed to create user")
        .id
}

fn new_post(title: &str) -> CreatePost {
    CreatePost {
        title: title.to_string(),
        content: "Long enough content for a valid blog post.".to_string(),
        image: None,
    }
}

fn raw_insert_post(db: &Database, author_id: i64, title: &str, slug: &str) {
    let conn = db.get().unwrap();
    conn.execute(
        "INSERT INTO posts (author_id, title, slug, content) VALUES (?, ?, ?, ?)",
        (author_id, title, slug, "Seeded content body text."),
    )
    .unwrap();
}

mod slug_integration_tests {
    use super::*;

    #[test]
    fn test_repeated_titles_get_increasing_suffixes() {
        let db = create_test_db();
        let author = create_author(&db, "slugs@example.com");

        let first = posts::create_post(&db, author, &new_post("Hello World")).unwrap();
        let second = posts::create_post(&db, author, &new_post("Hello World")).unwrap();
        let third = posts::create_post(&db, author, &new_post("Hello World")).unwrap();

        assert_eq!(first.slug, "hello-world");
        assert_eq!(second.slug, "hello-world-1");
        assert_eq!(third.slug, "hello-world-2");
    }

    #[test]
    fn test_punctuation_only_title_is_rejected() {
        let db = create_test_db();
        let author = create_author(&db, "punct@example.com");

        let result = slug::generate_unique_slug(&db, "!!!", None);
        assert!(matches!(result, Err(ServiceError::InvalidTitle)));

        let result = posts::create_post(&db, author, &new_post("!!!"));
        assert!(matches!(result, Err(ServiceError::InvalidTitle)));
    }

    #[test]
    fn test_generator_skips_seeded_slug() {
        let db = create_test_db();
        let author = create_author(&db, "seeded@example.com");

        raw_insert_post(&db, author, "Race Me", "race-me");

        let generated = slug::generate_unique_slug(&db, "Race Me", None).unwrap();
        assert_eq!(generated, "race-me-1");

        let created = posts::create_post(&db, author, &new_post("Race Me")).unwrap();
        assert_eq!(created.slug, "race-me-1");
    }

    #[test]
    fn test_concurrent_creates_commit_distinct_slugs() {
        let db = create_test_db();
        let author = create_author(&db, "race@example.com");

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let db = db.clone();
                std::thread::spawn(move || {
                    posts::create_post(&db, author, &new_post("Race Condition"))
                        .expect("concurrent create failed")
                        .slug
                })
            })
            .collect();

        let slugs: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_ne!(slugs[0], slugs[1]);

        let listing = posts::list_posts(&db, 1, 10, None).unwrap();
        assert_eq!(listing.total_posts, 2);
    }

    #[test]
    fn test_editing_with_own_title_keeps_slug() {
        let db = create_test_db();
        let author = create_author(&db, "edit@example.com");

        let post = posts::create_post(&db, author, &new_post("Hello World")).unwrap();
        let update = UpdatePost {
            title: Some("Hello World".to_string()),
            content: Some("Revised content that is long enough.".to_string()),
            image: None,
        };
        let updated = posts::update_post(&db, post.id, author, &update).unwrap();

        assert_eq!(updated.slug, "hello-world");
        assert_eq!(updated.content, "Revised content that is long enough.");
    }

    #[test]
    fn test_editing_new_title_regenerates_slug() {
        let db = create_test_db();
        let author = create_author(&db, "retitle@example.com");

        let post = posts::create_post(&db, author, &new_post("Original Title")).unwrap();
        let update = UpdatePost {
            title: Some("Fresh Title".to_string()),
            ..Default::default()
        };
        let updated = posts::update_post(&db, post.id, author, &update).unwrap();

        assert_eq!(updated.slug, "fresh-title");
    }

    #[test]
    fn test_editing_into_taken_title_gets_suffix() {
        let db = create_test_db();
        let author = create_author(&db, "takeover@example.com");

        posts::create_post(&db, author, &new_post("First Post")).unwrap();
        let other = posts::create_post(&db, author, &new_post("Second Post")).unwrap();

        let update = UpdatePost {
            title: Some("First Post".to_string()),
            ..Default::default()
        };
        let updated = posts::update_post(&db, other.id, author, &update).unwrap();

        assert_eq!(updated.slug, "first-post-1");
    }
}

mod pagination_integration_tests {
    use super::*;

    #[test]
    fn test_empty_table_is_one_empty_page() {
        let db = create_test_db();

        let page = posts::list_posts(&db, 1, 2, None).unwrap();

        assert!(page.items.is_empty());
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.total_posts, 0);
        assert!(!page.has_prev);
        assert!(!page.has_next);
    }

    #[test]
    fn test_five_posts_paginate_into_three_pages() {
        let db = create_test_db();
        let author = create_author(&db, "pages@example.com");
        for title in ["Post One", "Post Two", "Post Three", "Post Four", "Post Five"] {
            posts::create_post(&db, author, &new_post(title)).unwrap();
        }

        let first = posts::list_posts(&db, 1, 2, None).unwrap();
        assert_eq!(first.items.len(), 2);
        assert_eq!(first.items[0].title, "Post Five");
        assert_eq!(first.items[1].title, "Post Four");
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.total_posts, 5);
        assert!(!first.has_prev);
        assert!(first.has_next);

        let second = posts::list_posts(&db, 2, 2, None).unwrap();
        assert_eq!(second.items.len(), 2);
        assert!(second.has_prev);
        assert!(second.has_next);

        let last = posts::list_posts(&db, 3, 2, None).unwrap();
        assert_eq!(last.items.len(), 1);
        assert_eq!(last.items[0].title, "Post One");
        assert!(!last.has_next);
    }

    #[test]
    fn test_out_of_range_page_clamps_to_last() {
        let db = create_test_db();
        let author = create_author(&db, "clamp@example.com");
        for title in ["Post One", "Post Two", "Post Three", "Post Four", "Post Five"] {
            posts::create_post(&db, author, &new_post(title)).unwrap();
        }

        let page = posts::list_posts(&db, 10, 2, None).unwrap();

        assert_eq!(page.page, 3);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].title, "Post One");
        assert!(page.has_prev);
        assert!(!page.has_next);
    }

    #[test]
    fn test_zero_page_size_is_rejected_before_querying() {
        let db = create_test_db();
        let result = posts::list_posts(&db, 1, 0, None);
        assert!(matches!(result, Err(ServiceError::InvalidPageSize)));
    }

    #[test]
    fn test_title_filter_is_case_insensitive_substring() {
        let db = create_test_db();
        let author = create_author(&db, "filter@example.com");
        posts::create_post(&db, author, &new_post("Rust Ownership")).unwrap();
        posts::create_post(&db, author, &new_post("Cooking Pasta")).unwrap();
        posts::create_post(&db, author, &new_post("RUSTY Nails")).unwrap();

        let lower = posts::list_posts(&db, 1, 10, Some("rust")).unwrap();
        assert_eq!(lower.total_posts, 2);

        let upper = posts::list_posts(&db, 1, 10, Some("RUST")).unwrap();
        assert_eq!(upper.total_posts, 2);

        let none = posts::list_posts(&db, 1, 10, Some("quantum")).unwrap();
        assert_eq!(none.total_posts, 0);
        assert_eq!(none.total_pages, 1);
    }

    #[test]
    fn test_identical_calls_return_identical_pages() {
        let db = create_test_db();
        let author = create_author(&db, "idem@example.com");
        for title in ["Post One", "Post Two", "Post Three"] {
            posts::create_post(&db, author, &new_post(title)).unwrap();
        }

        let first = posts::list_posts(&db, 1, 2, None).unwrap();
        let second = posts::list_posts(&db, 1, 2, None).unwrap();

        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }
}

mod post_crud_tests {
    use super::*;

    #[test]
    fn test_create_and_fetch_by_slug() {
        let db = create_test_db();
        let author = create_author(&db, "crud@example.com");

        let created = posts::create_post(&db, author, &new_post("My First Post")).unwrap();
        let fetched = posts::get_post_by_slug(&db, "my-first-post")
            .unwrap()
            .expect("post should exist");

        assert_eq!(fetched.post.id, created.id);
        assert_eq!(fetched.post.author_id, author);
        let author_summary = fetched.author.expect("author should be joined");
        assert_eq!(author_summary.name, "Test Author");
    }

    #[test]
    fn test_fetch_unknown_slug_is_none() {
        let db = create_test_db();
        assert!(posts::get_post_by_slug(&db, "missing").unwrap().is_none());
    }

    #[test]
    fn test_title_length_is_validated() {
        let db = create_test_db();
        let author = create_author(&db, "short@example.com");

        let result = posts::create_post(&db, author, &new_post("Hi"));
        assert!(matches!(result, Err(ServiceError::Validation(_))));

        let result = posts::create_post(&db, author, &new_post(&"x".repeat(101)));
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[test]
    fn test_content_length_is_validated() {
        let db = create_test_db();
        let author = create_author(&db, "content@example.com");

        let input = CreatePost {
            title: "Valid Title".to_string(),
            content: "tiny".to_string(),
            image: None,
        };
        let result = posts::create_post(&db, author, &input);
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[test]
    fn test_only_the_author_may_edit() {
        let db = create_test_db();
        let author = create_author(&db, "owner@example.com");
        let intruder = create_author(&db, "intruder@example.com");

        let post = posts::create_post(&db, author, &new_post("Protected Post")).unwrap();
        let update = UpdatePost {
            content: Some("Hijacked content that is long enough.".to_string()),
            ..Default::default()
        };

        let result = posts::update_post(&db, post.id, intruder, &update);
        assert!(matches!(result, Err(ServiceError::Forbidden)));
    }

    #[test]
    fn test_only_the_author_may_delete() {
        let db = create_test_db();
        let author = create_author(&db, "owner2@example.com");
        let intruder = create_author(&db, "intruder2@example.com");

        let post = posts::create_post(&db, author, &new_post("Protected Post")).unwrap();

        let result = posts::delete_post(&db, post.id, intruder);
        assert!(matches!(result, Err(ServiceError::Forbidden)));

        posts::delete_post(&db, post.id, author).unwrap();
        assert!(posts::get_post_by_slug(&db, "protected-post")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_mutating_missing_post_is_not_found() {
        let db = create_test_db();
        let author = create_author(&db, "missing@example.com");

        let update = UpdatePost::default();
        assert!(matches!(
            posts::update_post(&db, 9999, author, &update),
            Err(ServiceError::NotFound)
        ));
        assert!(matches!(
            posts::delete_post(&db, 9999, author),
            Err(ServiceError::NotFound)
        ));
    }
}

mod auth_integration_tests {
    use super::*;

    #[test]
    fn test_register_and_authenticate() {
        let db = create_test_db();

        let user = auth::register_user(&db, "Jess", "jess@example.com", TEST_PASSWORD).unwrap();
        assert!(user.id > 0);

        let authed = auth::authenticate(&db, "jess@example.com", TEST_PASSWORD)
            .unwrap()
            .expect("credentials should match");
        assert_eq!(authed.email, "jess@example.com");
        assert_eq!(authed.name, "Jess");
    }

    #[test]
    fn test_authenticate_wrong_password() {
        let db = create_test_db();
        auth::register_user(&db, "Jess", "jess@example.com", TEST_PASSWORD).unwrap();

        let result = auth::authenticate(&db, "jess@example.com", WRONG_PASSWORD).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_authenticate_unknown_email() {
        let db = create_test_db();
        let result = auth::authenticate(&db, "ghost@example.com", TEST_PASSWORD).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_duplicate_email_is_rejected() {
        let db = create_test_db();
        auth::register_user(&db, "Jess", "jess@example.com", TEST_PASSWORD).unwrap();

        let result = auth::register_user(&db, "Other", "jess@example.com", TEST_PASSWORD);
        assert!(matches!(result, Err(ServiceError::DuplicateEmail)));
    }

    #[test]
    fn test_weak_password_is_rejected() {
        let db = create_test_db();
        let result = auth::register_user(&db, "Jess", "jess@example.com", "weak");
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[test]
    fn test_session_roundtrip_and_logout() {
        let db = create_test_db();
        let user_id = create_author(&db, "session@example.com");

        let token = auth::create_session(&db, user_id, 1).unwrap();
        let user = auth::validate_session(&db, &token)
            .unwrap()
            .expect("session should be valid");
        assert_eq!(user.id, user_id);

        auth::delete_session(&db, &token).unwrap();
        assert!(auth::validate_session(&db, &token).unwrap().is_none());
    }

    #[test]
    fn test_expired_session_is_invalid() {
        let db = create_test_db();
        let user_id = create_author(&db, "expired@example.com");

        let token = auth::create_session(&db, user_id, -1).unwrap();
        assert!(auth::validate_session(&db, &token).unwrap().is_none());

        let removed = auth::cleanup_expired_sessions(&db).unwrap();
        assert_eq!(removed, 1);
    }
}

mod password_reset_tests {
    use super::*;

    #[test]
    fn test_full_reset_flow() {
        let db = create_test_db();
        let user_id = create_author(&db, "reset@example.com");
        let session = auth::create_session(&db, user_id, 1).unwrap();

        let token = password_reset::create_reset_token(&db, "reset@example.com", 30)
            .unwrap()
            .expect("account exists");

        password_reset::reset_password(&db, &token, NEW_PASSWORD).unwrap();

        // Old credentials no longer work, new ones do, and the open session
        // was revoked along with the reset.
        assert!(auth::authenticate(&db, "reset@example.com", TEST_PASSWORD)
            .unwrap()
            .is_none());
        assert!(auth::authenticate(&db, "reset@example.com", NEW_PASSWORD)
            .unwrap()
            .is_some());
        assert!(auth::validate_session(&db, &session).unwrap().is_none());
    }

    #[test]
    fn test_reset_token_is_single_use() {
        let db = create_test_db();
        create_author(&db, "once@example.com");

        let token = password_reset::create_reset_token(&db, "once@example.com", 30)
            .unwrap()
            .unwrap();
        password_reset::reset_password(&db, &token, NEW_PASSWORD).unwrap();

        let result = password_reset::reset_password(&db, &token, "OtherPass789");
        assert!(matches!(result, Err(ServiceError::NotFound)));
    }

    #[test]
    fn test_unknown_email_yields_no_token() {
        let db = create_test_db();
        let token = password_reset::create_reset_token(&db, "ghost@example.com", 30).unwrap();
        assert!(token.is_none());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let db = create_test_db();
        create_author(&db, "late@example.com");

        let token = password_reset::create_reset_token(&db, "late@example.com", -1)
            .unwrap()
            .unwrap();
        let result = password_reset::reset_password(&db, &token, NEW_PASSWORD);
        assert!(matches!(result, Err(ServiceError::NotFound)));
    }
}

mod contact_tests {
    use super::*;

    #[test]
    fn test_submission_is_stored() {
        let db = create_test_db();
        let input = NewContact {
            name: "Ravi".to_string(),
            email: "ravi@example.com".to_string(),
            phone: "555-0100".to_string(),
            message: "Enjoyed the last post.".to_string(),
        };

        let stored = contact::submit_contact(&db, &input).unwrap();
        assert!(stored.id > 0);
        assert_eq!(stored.name, "Ravi");
        assert_eq!(stored.phone, "555-0100");
        assert!(!stored.created_at.is_empty());
    }

    #[test]
    fn test_blank_fields_are_rejected() {
        let db = create_test_db();
        let input = NewContact {
            name: "Ravi".to_string(),
            email: "ravi@example.com".to_string(),
            phone: "  ".to_string(),
            message: "Hello".to_string(),
        };

        let result = contact::submit_contact(&db, &input);
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }
}

mod media_tests {
    use super::*;
    use std::path::PathBuf;

    const MAX_BYTES: usize = 10 * 1024 * 1024;

    // Minimal PNG: magic bytes are all `infer` needs to identify the type.
    fn png_bytes() -> Vec<u8> {
        let mut data = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        data.extend_from_slice(&[0u8; 64]);
        data
    }

    fn upload_dir() -> PathBuf {
        use rand::Rng;
        let id: u64 = rand::thread_rng().gen();
        std::env::temp_dir().join(format!("quillpost_uploads_{}", id))
    }

    #[test]
    fn test_valid_png_is_stored() {
        let db = create_test_db();
        let dir = upload_dir();
        let author = create_author(&db, "upload@example.com");

        let stored = media::store_upload(
            &db,
            &dir,
            MAX_BYTES,
            "photo.png",
            &png_bytes(),
            Some(author),
        )
        .unwrap();

        assert!(stored.filename.ends_with(".png"));
        assert_eq!(stored.original_name, "photo.png");
        assert_eq!(stored.mime_type, "image/png");
        assert!(dir.join(&stored.filename).exists());

        let found = media::get_media_by_filename(&db, &stored.filename)
            .unwrap()
            .expect("media row should exist");
        assert_eq!(found.id, stored.id);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_disallowed_extension_is_rejected() {
        let db = create_test_db();
        let dir = upload_dir();

        let result = media::store_upload(&db, &dir, MAX_BYTES, "notes.txt", &png_bytes(), None);
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[test]
    fn test_mismatched_content_is_rejected() {
        let db = create_test_db();
        let dir = upload_dir();

        // PNG bytes wearing a .gif extension
        let result = media::store_upload(&db, &dir, MAX_BYTES, "photo.gif", &png_bytes(), None);
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[test]
    fn test_oversized_upload_is_rejected() {
        let db = create_test_db();
        let dir = upload_dir();

        let result = media::store_upload(&db, &dir, 16, "photo.png", &png_bytes(), None);
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[test]
    fn test_empty_upload_is_rejected() {
        let db = create_test_db();
        let dir = upload_dir();

        let result = media::store_upload(&db, &dir, MAX_BYTES, "photo.png", &[], None);
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }
}
