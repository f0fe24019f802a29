use anyhow::Result;
use std::path::PathBuf;

pub async fn run(path: PathBuf, name: Option<String>) -> Result<()> {
    let site_name = name.unwrap_or_else(|| "My Blog".to_string());

    std::fs::create_dir_all(&path)?;
    std::fs::create_dir_all(path.join("data"))?;
    std::fs::create_dir_all(path.join("data/uploads"))?;

    let config = format!(
        r#"[site]
title = "{}"
about = "About me section"
url = "http://localhost:3000"

[server]
host = "127.0.0.1"
port = 3000

[database]
path = "./data/quill.db"

[content]
posts_per_page = 3
max_page_size = 50

[media]
upload_dir = "./data/uploads"
max_upload_mb = 10

[auth]
token_lifetime_hours = 1
reset_token_lifetime_minutes = 30

[mail]
enabled = false
# smtp_host = "smtp.example.com"
# smtp_port = 587
# username = ""
# password = ""
# from = "no-reply@example.com"
# reset_url_base = "https://blog.example.com"
"#,
        site_name
    );

    std::fs::write(path.join("quill.toml"), config)?;

    tracing::info!("Created new quillpost site at {:?}", path);
    tracing::info!("Run 'quill migrate' to set up the database");
    tracing::info!("Run 'quill serve' to start the server");

    Ok(())
}
