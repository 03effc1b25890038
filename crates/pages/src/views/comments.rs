use domain::{Comment, FormField};
use maud::{html, Markup};

use crate::form::{CommentForm, FormState};

/// Approved comments in the order the query returned them.
pub fn comment_list<'a>(comments: impl IntoIterator<Item = &'a Comment>) -> Markup {
    html! {
        div class="flex flex-col p-10 my-10 max-w-2xl mx-auto shadow-yellow-500 space-y-2" id="comments" {
            h3 { "Comments:" }
            hr class="pb-2";
            @for comment in comments.into_iter().filter(|c| c.approved) {
                div data-comment-id=(comment.id) {
                    p {
                        span class="text-yellow-500" { (comment.name) }
                        ": " (comment.comment)
                    }
                }
            }
        }
    }
}

pub fn comment_form(form: &CommentForm, action: &str) -> Markup {
    if form.state() == FormState::Submitted {
        return html! {
            div class="flex flex-col py-10 my-10 bg-yellow-500 text-white max-w-2xl mx-auto px-10 shadow rounded" id="comment-thanks" {
                h1 { "Thank you for the comment" }
                p { "Comments will be visible here once approved" }
            }
        };
    }

    let values = form.values();
    html! {
        form method="post" action=(action) class="flex flex-col p-5 max-w-2xl mx-auto mb-10" id="comment-form" {
            h3 class="text-2xl font-bold mb-5" { "Comment Here:" }

            input type="hidden" name="_id" value=(values.post_id);

            label class="block mb-5" {
                span class="text-gray-700" { "Name" }
                input name="name" type="text" value=(values.name)
                    class="shadow border rounded py-2 px-3 form-input mt-1 block w-full"
                    placeholder="Your name";
            }
            label class="block mb-5" {
                span class="text-gray-700" { "Email" }
                input name="email" type="email" value=(values.email)
                    class="shadow border rounded py-2 px-3 form-input mt-1 block w-full"
                    placeholder="you@example.com";
            }
            label class="block mb-5" {
                span class="text-gray-700" { "Comment" }
                textarea name="comment" rows="8"
                    class="shadow border rounded py-2 px-3 form-textarea mt-1 block w-full"
                    placeholder="Say something nice" { (values.comment) }
            }

            div class="flex flex-col p-5" {
                @for field in FormField::ALL {
                    @if form.errors().contains(&field) {
                        span class="text-red-500" data-field=(field.as_str()) { (field.required_message()) }
                    }
                }
            }

            input type="submit"
                class="shadow border rounded bg-yellow-500 hover:bg-yellow-400 py-5 hover:cursor-pointer";
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::CommentTransport;
    use crate::SubmitError;
    use async_trait::async_trait;
    use domain::CommentSubmission;

    fn comment(id: &str, text: &str, approved: bool) -> Comment {
        Comment {
            id: id.into(),
            created_at: None,
            post: None,
            name: format!("user-{id}"),
            email: "x@example.com".into(),
            comment: text.into(),
            approved,
        }
    }

    struct Accepting;

    #[async_trait]
    impl CommentTransport for Accepting {
        async fn send(&self, _: &CommentSubmission) -> Result<(), SubmitError> {
            Ok(())
        }
    }

    struct Down;

    #[async_trait]
    impl CommentTransport for Down {
        async fn send(&self, _: &CommentSubmission) -> Result<(), SubmitError> {
            Err(SubmitError::Transport("connection refused".into()))
        }
    }

    fn filled() -> CommentForm {
        let mut form = CommentForm::new("p1");
        form.set(FormField::Name, "Ada");
        form.set(FormField::Email, "ada@example.com");
        form.set(FormField::Comment, "hi");
        form
    }

    #[test]
    fn list_keeps_order_and_hides_unapproved() {
        let comments = vec![
            comment("b", "second", true),
            comment("x", "hidden", false),
            comment("a", "first", true),
        ];
        let html = comment_list(&comments).into_string();

        assert!(!html.contains("hidden"));
        let second = html.find("second").unwrap();
        let first = html.find("first").unwrap();
        assert!(second < first);
    }

    #[test]
    fn only_missing_field_message_is_shown() {
        let mut form = filled();
        form.set(FormField::Name, "");
        assert!(!form.validate());

        let html = comment_form(&form, "/post/x/comment").into_string();
        assert!(html.contains("The name field is required"));
        assert!(!html.contains("The email field is required"));
        assert!(!html.contains("The comment field is required"));
        assert!(html.contains(r#"value="ada@example.com""#));
    }

    #[tokio::test]
    async fn successful_submit_replaces_form_with_thanks() {
        let mut form = filled();
        form.submit(&Accepting).await;

        let html = comment_form(&form, "/post/x/comment").into_string();
        assert!(html.contains("Thank you for the comment"));
        assert!(!html.contains("<form"));
    }

    #[tokio::test]
    async fn failed_submit_shows_form_without_error() {
        let mut form = filled();
        form.submit(&Down).await;

        let html = comment_form(&form, "/post/x/comment").into_string();
        assert!(html.contains("<form"));
        assert!(!html.contains("text-red-500"));
        assert!(!html.contains("Thank you"));
    }
}
