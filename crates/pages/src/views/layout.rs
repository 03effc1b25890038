use maud::{html, Markup, DOCTYPE};

pub fn page(site_title: &str, title: Option<&str>, body: Markup) -> Markup {
    let full_title = match title {
        Some(t) if !t.is_empty() => format!("{} | {}", t, site_title),
        _ => site_title.to_string(),
    };

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (full_title) }
            }
            body {
                (header(site_title))
                (body)
            }
        }
    }
}

fn header(site_title: &str) -> Markup {
    html! {
        header class="flex justify-between p-5 max-w-7xl mx-auto" {
            div class="flex items-center space-x-5" {
                a href="/" class="font-serif text-2xl" { (site_title) }
                nav class="hidden md:inline-flex items-center space-x-5" {
                    a href="/" { "Home" }
                }
            }
        }
    }
}
