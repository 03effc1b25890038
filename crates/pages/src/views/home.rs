use domain::PostSummary;
use maud::{html, Markup};

use super::banner::banner;
use super::Site;

pub fn home_body(site: &Site, posts: &[PostSummary]) -> Markup {
    html! {
        main class="max-w-7xl mx-auto" {
            (banner())
            div class="grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-3 gap-3 md:gap-6 p-2 md:p-6" {
                @for post in posts {
                    @if let Some(slug) = post.slug.as_ref().and_then(|s| s.to_slug().ok()) {
                        a href={ "/post/" (slug.as_str()) } class="border rounded-lg group cursor-pointer overflow-hidden" {
                            @if let Some(src) = post.main_image.as_ref().and_then(|i| site.images.sized(i, Some(600), None).ok()) {
                                img class="h-60 w-full object-cover" src=(src) alt=(post.title);
                            }
                            div class="flex justify-between p-5 bg-white" {
                                div {
                                    p class="text-lg font-bold" { (post.title) }
                                    p class="text-xs" {
                                        (post.description)
                                        @if let Some(author) = &post.author_name {
                                            " by " (author)
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
