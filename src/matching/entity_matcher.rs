//! Exact-after-normalization matching of candidate records.
//!
//! People match on any email or phone, companies on website domain
//! (including subdomains) or on name. The first matching record in the
//! fetched order wins; there is no scoring.

use crate::domain::normalize::{normalize_domain, normalize_email, normalize_name, normalize_phone};
use crate::domain::record::{first_text, string_candidates, EMAIL_FIELDS, PHONE_FIELDS};
use serde_json::Value;

/// Normalized lookup keys for a person.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonMatcher {
    email: String,
    phone: String,
}

impl PersonMatcher {
    pub fn new(email: Option<&str>, phone: Option<&str>) -> Self {
        Self {
            email: normalize_email(email.unwrap_or_default()),
            phone: normalize_phone(phone.unwrap_or_default()),
        }
    }

    /// True when neither key survived normalization; such a matcher never matches.
    pub fn is_empty(&self) -> bool {
        self.email.is_empty() && self.phone.is_empty()
    }

    /// Does `person` carry the target email or phone in any of its fields?
    pub fn matches(&self, person: &Value) -> bool {
        let by_email = !self.email.is_empty()
            && string_candidates(person, &EMAIL_FIELDS)
                .into_iter()
                .any(|e| normalize_email(e) == self.email);

        let by_phone = !self.phone.is_empty()
            && string_candidates(person, &PHONE_FIELDS)
                .into_iter()
                .any(|p| normalize_phone(p) == self.phone);

        by_email || by_phone
    }

    /// First record in `people` that matches.
    pub fn find<'a>(&self, people: &'a [Value]) -> Option<&'a Value> {
        if self.is_empty() {
            return None;
        }
        people.iter().find(|p| self.matches(p))
    }
}

/// Normalized lookup keys for a company.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyMatcher {
    domain: String,
    name: String,
}

impl CompanyMatcher {
    pub fn new(domain: Option<&str>, name: Option<&str>) -> Self {
        Self {
            domain: normalize_domain(domain.unwrap_or_default()),
            name: normalize_name(name.unwrap_or_default()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.domain.is_empty() && self.name.is_empty()
    }

    /// Does `company` sit on the target domain (or a subdomain of it), or carry the target name?
    pub fn matches(&self, company: &Value) -> bool {
        let by_domain = !self.domain.is_empty() && {
            let website = normalize_domain(&first_text(company, &["website", "site"]));
            website == self.domain || website.ends_with(&format!(".{}", self.domain))
        };

        let by_name =
            !self.name.is_empty() && normalize_name(&first_text(company, &["name"])) == self.name;

        by_domain || by_name
    }

    /// First record in `companies` that matches.
    pub fn find<'a>(&self, companies: &'a [Value]) -> Option<&'a Value> {
        if self.is_empty() {
            return None;
        }
        companies.iter().find(|c| self.matches(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_person_matches_any_email_shape_case_insensitively() {
        let person = json!({"id": 1, "emails": ["a@x.com", {"value": "b@x.com"}]});

        assert!(PersonMatcher::new(Some("B@X.COM"), None).matches(&person));
        assert!(PersonMatcher::new(Some(" a@x.com "), None).matches(&person));
        assert!(!PersonMatcher::new(Some("c@x.com"), None).matches(&person));
    }

    #[test]
    fn test_person_matches_on_phone() {
        let person = json!({"id": 1, "phones": [{"phone": "0055 11 98765-4321"}]});

        assert!(PersonMatcher::new(None, Some("+5511987654321")).matches(&person));
        assert!(!PersonMatcher::new(None, Some("+5511000000000")).matches(&person));
    }

    #[test]
    fn test_either_key_suffices() {
        let person = json!({"email": "x@y.com", "phone": "123"});
        assert!(PersonMatcher::new(Some("nope@y.com"), Some("1-2-3")).matches(&person));
    }

    #[test]
    fn test_empty_keys_never_match_empty_fields() {
        let person = json!({"id": 1, "email": "", "phone": ""});
        let matcher = PersonMatcher::new(Some("   "), Some("n/a"));

        assert!(matcher.is_empty());
        assert!(!matcher.matches(&person));
        assert!(matcher.find(&[person]).is_none());
    }

    #[test]
    fn test_person_find_returns_first_in_order() {
        let people = vec![
            json!({"id": 1, "email": "other@x.com"}),
            json!({"id": 2, "email": "dup@x.com"}),
            json!({"id": 3, "emails": ["DUP@x.com"]}),
        ];

        let found = PersonMatcher::new(Some("dup@x.com"), None).find(&people);
        assert_eq!(found.and_then(|p| p.get("id")), Some(&json!(2)));
    }

    #[test]
    fn test_company_matches_domain_and_subdomain() {
        let matcher = CompanyMatcher::new(Some("https://www.Acme.com/"), None);

        assert!(matcher.matches(&json!({"website": "http://acme.com"})));
        assert!(matcher.matches(&json!({"site": "shop.acme.com/"})));
        assert!(!matcher.matches(&json!({"website": "notacme.com"})));
        assert!(!matcher.matches(&json!({"website": "acme.com.br"})));
        assert!(!matcher.matches(&json!({"name": "acme.com"})));
    }

    #[test]
    fn test_company_falls_back_to_site_when_website_blank() {
        let matcher = CompanyMatcher::new(Some("acme.com"), None);
        assert!(matcher.matches(&json!({"website": "", "site": "www.acme.com"})));
    }

    #[test]
    fn test_company_matches_exact_name() {
        let matcher = CompanyMatcher::new(None, Some("  ACME Ltda "));

        assert!(matcher.matches(&json!({"name": "acme ltda"})));
        assert!(!matcher.matches(&json!({"name": "acme ltda."})));
        assert!(!matcher.matches(&json!({"website": "acme ltda"})));
    }

    #[test]
    fn test_company_either_condition_suffices() {
        let matcher = CompanyMatcher::new(Some("acme.com"), Some("Acme"));
        assert!(matcher.matches(&json!({"name": "Acme", "website": "other.com"})));
        assert!(matcher.matches(&json!({"name": "Other", "website": "acme.com"})));
    }

    #[test]
    fn test_empty_company_matcher_never_matches() {
        let matcher = CompanyMatcher::new(Some(""), Some(" "));
        assert!(matcher.is_empty());
        assert!(!matcher.matches(&json!({"name": "", "website": ""})));
    }
}
