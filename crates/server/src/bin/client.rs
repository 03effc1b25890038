use async_trait::async_trait;
use domain::{CommentSubmission, FormField};
use pages::{CommentForm, CommentTransport, FormState, SubmitError};

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";

/// Posts submissions to `/api/createComment` as JSON.
struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

#[async_trait]
impl CommentTransport for HttpTransport {
    async fn send(&self, submission: &CommentSubmission) -> Result<(), SubmitError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .json(submission)
            .send()
            .await
            .map_err(|e| SubmitError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(SubmitError::Rejected(resp.status().as_u16()));
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("usage: client <post-id> <slug> [name] [email] [comment]");
        std::process::exit(2);
    }
    let post_id = &args[1];
    let slug = &args[2];
    let name = args.get(3).map(String::as_str).unwrap_or("Ferris");
    let email = args.get(4).map(String::as_str).unwrap_or("ferris@example.com");
    let text = args
        .get(5)
        .map(String::as_str)
        .unwrap_or("Hello from the command line!");

    let base_url =
        std::env::var("BLOG_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
    let client = reqwest::Client::new();
    println!("Starting blog comment client against {}...", base_url);

    println!("\n[1/3] Filling in the comment form...");
    let mut form = CommentForm::new(post_id.as_str());
    form.set(FormField::Name, name);
    form.set(FormField::Email, email);
    form.set(FormField::Comment, text);
    if !form.validate() {
        for field in form.errors() {
            println!("   -> ❌ {}", field.required_message());
        }
        return Ok(());
    }
    println!("   -> {} <{}>: {}", name, email, text);

    println!("\n[2/3] Submitting comment...");
    let transport = HttpTransport {
        client: client.clone(),
        endpoint: format!("{}/api/createComment", base_url),
    };
    match form.submit(&transport).await {
        FormState::Submitted => println!("   -> ✅ Sent successfully! It will appear once approved."),
        state => {
            println!("   -> ❌ Failed to send, form is back in {:?}", state);
            return Ok(());
        }
    }

    println!("\n[3/3] Fetching the post page...");
    let page_url = format!("{}/post/{}", base_url, slug);
    let resp = client.get(&page_url).send().await?;
    let status = resp.status();
    let cache = resp
        .headers()
        .get("x-cache")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();
    let html = resp.text().await?;
    println!("   -> {} ({} bytes, x-cache: {})", status, html.len(), cache);

    // 显示的评论只包含已审核的
    let shown = html.matches("data-comment-id=").count();
    println!("   -> {} approved comment(s) on the page", shown);

    Ok(())
}
