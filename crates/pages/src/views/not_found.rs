use maud::{html, Markup};

pub fn not_found(requested: &str) -> Markup {
    html! {
        main class="max-w-3xl mx-auto p-5" {
            h1 class="text-3xl mt-10 mb-3" { "404 - Page not found" }
            p { "Nothing is published at " code { (requested) } "." }
            a href="/" class="text-blue-500 hover:underline" { "Back to all posts" }
        }
    }
}
