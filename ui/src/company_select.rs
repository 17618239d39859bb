use dioxus::prelude::*;
use types::company::{Company, CompanyQuery};

use crate::is_unauthorized;

/// A `<select>` over the companies the user can see.
#[component]
pub fn CompanySelect(
    id: String,
    value: Option<i64>,
    on_change: EventHandler<Option<i64>>,
    #[props(default = "All companies".to_string())] placeholder: String,
) -> Element {
    let mut companies = use_signal(Vec::<Company>::new);

    use_effect(move || {
        spawn(async move {
            match api::list_companies(CompanyQuery::default()).await {
                Ok(page) => companies.set(page.results),
                Err(error) if is_unauthorized(&error) => crate::force_logout(),
                // The select just stays empty.
                Err(_) => {}
            }
        });
    });

    let selected = value.map(|v| v.to_string()).unwrap_or_default();

    rsx! {
        select {
            id,
            class: "form-input",
            value: "{selected}",
            onchange: move |e| on_change.call(e.value().parse().ok()),
            option { value: "", "{placeholder}" }
            for company in companies.read().iter() {
                option {
                    key: "{company.id}",
                    value: "{company.id}",
                    selected: value == Some(company.id),
                    "{company.name}"
                }
            }
        }
    }
}
