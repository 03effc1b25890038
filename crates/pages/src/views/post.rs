use domain::Post;
use maud::{html, Markup};

use super::comments::{comment_form, comment_list};
use super::Site;
use crate::form::CommentForm;
use crate::portable_text::PortableText;

pub fn post_body(site: &Site, post: &Post, form: &CommentForm, form_action: &str) -> Markup {
    let main_image = post
        .main_image
        .as_ref()
        .and_then(|img| site.images.url(img).ok());
    let author_name = post.author.as_ref().map(|a| a.name.as_str()).unwrap_or("");
    let avatar = post
        .author
        .as_ref()
        .and_then(|a| a.image.as_ref())
        .and_then(|img| site.images.sized(img, Some(96), Some(96)).ok());

    html! {
        main {
            @if let Some(src) = main_image {
                img class="w-full h-[50vh] object-cover" src=(src) alt=(post.title);
            }

            article class="max-w-3xl mx-auto p-5" {
                h1 class="text-3xl mt-10 mb-3 font-extrabold" { (post.title) }
                h2 class="text-sm font-light" { (post.description) }
                div class="flex mt-8" {
                    @if let Some(src) = avatar {
                        img class="w-12 h-12 rounded-full" src=(src) alt=(author_name);
                    }
                    p class="font-extralight text-sm pl-5" {
                        "Post by " span class="font-bold" { (author_name) }
                        br;
                        "published at " (post.created_at.format("%-d %B %Y, %H:%M UTC").to_string())
                    }
                }

                div class="mt-10" {
                    (PortableText::new(&site.serializers, &site.images).render(&post.body))
                }
            }

            hr class="max-w-lg my-5 mx-auto border border-yellow-500";

            (comment_form(form, form_action))
            (comment_list(&post.comments))
        }
    }
}
