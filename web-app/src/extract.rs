//! Label driven field lookup over the registration search page.
//!
//! The page is not consistent about where a value lives. Some are rendered
//! as cards (`.hrcd-cardbody` holding a label `<span>` and a value `<p>`),
//! others as label/value pairs grouped under an `<h3>` inside a
//! `.hrc-details-card`. Every lookup matches labels case-insensitively by
//! substring and reads the first `<p>` that follows the label.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{node::Node, ElementRef, Html, Selector};
use shared::data::{InsuranceStatus, VehicleInfo, VehicleQuery};

lazy_static! {
    static ref CARD_BODY: Selector = selector(".hrcd-cardbody");
    static ref SPAN: Selector = selector("span");
    static ref PARAGRAPH: Selector = selector("p");
    static ref SECTION_HEADING: Selector = selector("h3");
    static ref EXPIRED_TITLE: Selector = selector(".insurance-alert-box.expired .title");
    static ref DIGITS: Regex = Regex::new(r"\d+").expect("digit pattern is valid");
}

const DETAILS_CARD_CLASS: &str = "hrc-details-card";

const VEHICLE_DETAILS_SECTION: &str = "Vehicle Details";
const VEHICLE_DETAILS_LABELS: [&str; 4] =
    ["Maker Model", "Cubic Capacity", "Seating Capacity", "Fuel Norms"];

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

pub struct RcPage {
    document: Html,
}

impl RcPage {
    #[must_use]
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    /// Value of the first card whose label contains `label`.
    #[must_use]
    pub fn extract_card(&self, label: &str) -> Option<String> {
        let card = self.document.select(&CARD_BODY).find(|card| {
            card.select(&SPAN)
                .next()
                .is_some_and(|span| contains_label(span, label))
        })?;

        card.select(&PARAGRAPH).next().map(stripped_text)
    }

    /// Looks up each of `labels` inside the details card headed by `heading`.
    ///
    /// Keys are the labels lower-cased with spaces replaced by underscores.
    /// Labels that can't be found are left out.
    #[must_use]
    pub fn extract_from_section(&self, heading: &str, labels: &[&str]) -> BTreeMap<String, String> {
        let Some(card) = self.details_card(heading) else {
            return BTreeMap::new();
        };

        labels
            .iter()
            .filter_map(|label| {
                let span = card.select(&SPAN).find(|span| contains_label(*span, label))?;
                let value = self.paragraph_after(span)?;
                Some((field_key(label), stripped_text(value)))
            })
            .collect()
    }

    /// Value following the first label anywhere on the page that contains `label`.
    #[must_use]
    pub fn get_value(&self, label: &str) -> Option<String> {
        let span = self
            .document
            .select(&SPAN)
            .find(|span| contains_label(*span, label))?;

        self.paragraph_after(span).map(stripped_text)
    }

    #[must_use]
    pub fn insurance_status(&self) -> InsuranceStatus {
        self.document
            .select(&EXPIRED_TITLE)
            .next()
            .and_then(|title| {
                let text: String = title.text().collect();
                let digits = DIGITS.find(&text)?.as_str();
                // Longer than u64 still means the alert is showing.
                Some(digits.parse::<u64>().unwrap_or(u64::MAX))
            })
            .map_or(InsuranceStatus::Active, |expired_days_ago| {
                InsuranceStatus::Expired { expired_days_ago }
            })
    }

    fn card_or_value(&self, label: &str) -> Option<String> {
        self.extract_card(label).or_else(|| self.get_value(label))
    }

    fn details_card(&self, heading: &str) -> Option<ElementRef<'_>> {
        let heading = self
            .document
            .select(&SECTION_HEADING)
            .find(|h3| contains_label(*h3, heading))?;

        heading
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|element| {
                element.value().name() == "div"
                    && element.value().classes().any(|class| class == DETAILS_CARD_CLASS)
            })
    }

    /// The first `<p>` after `anchor` in document order, not only among its siblings.
    fn paragraph_after<'a>(&'a self, anchor: ElementRef<'a>) -> Option<ElementRef<'a>> {
        self.document
            .tree
            .root()
            .descendants()
            .skip_while(|node| node.id() != anchor.id())
            .skip(1)
            .filter_map(ElementRef::wrap)
            .find(|element| element.value().name() == "p")
    }
}

fn contains_label(element: ElementRef<'_>, label: &str) -> bool {
    let text: String = element.text().collect();
    text.to_lowercase().contains(&label.to_lowercase())
}

/// Every text node trimmed, blank ones dropped, the rest joined without a separator.
fn stripped_text(element: ElementRef<'_>) -> String {
    element
        .descendants()
        .filter_map(|node| match node.value() {
            Node::Text(text) => Some(text.trim()),
            _ => None,
        })
        .filter(|text| !text.is_empty())
        .collect()
}

fn field_key(label: &str) -> String {
    label.to_lowercase().replace(' ', "_")
}

/// Assembles the full record for `query` from the search page `html`.
#[must_use]
pub fn extract(query: &VehicleQuery, html: &str) -> VehicleInfo {
    let page = RcPage::parse(html);
    let mut info = VehicleInfo::new(query);

    info.basic_info.owner_name = page.card_or_value("Owner Name");
    info.basic_info.father_name = page.get_value("Father's Name");
    info.basic_info.model_name = page.card_or_value("Model Name");
    info.basic_info.vehicle_class = page.get_value("Vehicle Class");
    info.basic_info.fuel_type = page.get_value("Fuel Type");
    info.basic_info.city = page.card_or_value("City Name");
    info.basic_info.address = page.card_or_value("Address");

    info.vehicle_details =
        page.extract_from_section(VEHICLE_DETAILS_SECTION, &VEHICLE_DETAILS_LABELS);

    info.insurance.status = page.insurance_status();
    info.insurance.company = page.get_value("Insurance Company");
    info.insurance.policy_number = page.get_value("Insurance No");
    info.insurance.valid_upto = page.get_value("Insurance Upto");

    info.validity.registration_date = page.get_value("Registration Date");
    info.validity.fitness_upto = page.get_value("Fitness Upto");
    info.validity.tax_upto = page.get_value("Tax Upto");

    info.puc.puc_no = page.get_value("PUC No");
    info.puc.puc_upto = page.get_value("PUC Upto");

    info.other_info.financer = page.get_value("Financier Name");
    info.other_info.permit_type = page.get_value("Permit Type");
    info.other_info.blacklist_status = page.get_value("Blacklist Status");
    info.other_info.noc = page.get_value("NOC Details");

    info
}
