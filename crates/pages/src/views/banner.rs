use maud::{html, Markup, PreEscaped};

pub fn banner() -> Markup {
    html! {
        div class="flex max-w-7xl mx-auto bg-green-500 rounded mt-5" {
            div class="p-10 space-y-5 py-[100px]" {
                h1 class="text-6xl max-w-xl font-serif" {
                    span class="underline decoration-black decoration-4" { "Better" }
                    (PreEscaped("&nbsp;"))
                    "place to write blog & connect"
                }
                h2 { "It is easier and free website to read content" }
            }
            div {}
        }
    }
}
