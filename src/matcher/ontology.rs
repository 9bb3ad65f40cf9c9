use ahash::AHashMap;
use std::sync::LazyLock;

/// A word-sense taxonomy the matcher measures semantic distance with.
pub trait Ontology: Send + Sync {
    /// Highest Wu-Palmer similarity over every sense pair of the two words,
    /// or `None` when either word has no sense.
    fn similarity(&self, a: &str, b: &str) -> Option<f64>;
}

/// Concept domains of common API field vocabulary, each split into synonym
/// sets. A word may belong to several sets, one per sense.
static DOMAINS: &[(&str, &[&[&str]])] = &[
    (
        "identity",
        &[
            &["id", "identifier", "key", "uuid", "uid", "guid", "pk", "code", "ref", "reference"],
            &["user", "person", "account", "member", "customer", "client", "owner", "contact"],
            &["username", "login", "handle", "nickname", "alias"],
            &["parent", "owner", "manager"],
            &["child", "children", "dependent"],
        ],
    ),
    (
        "naming",
        &[
            &["name", "title", "label", "displayname"],
            &["first", "given", "forename", "firstname", "fname"],
            &["last", "family", "surname", "lastname", "lname"],
            &["full", "complete", "whole", "fullname"],
        ],
    ),
    (
        "contact",
        &[
            &["email", "mail", "mailbox"],
            &["phone", "telephone", "mobile", "cell", "tel"],
            &["address", "location", "place", "addr", "street"],
            &["city", "town", "municipality"],
            &["country", "nation", "state", "region"],
            &["zip", "postcode", "postal"],
            &["url", "link", "href", "uri", "website", "web"],
        ],
    ),
    (
        "time",
        &[
            &["created", "creation", "create", "timestamp", "time", "datetime", "ts"],
            &["updated", "modified", "changed", "update", "modification"],
            &["date", "day", "birthday", "birth"],
            &["expires", "expiry", "expiration", "until", "deadline"],
            &["start", "begin", "from"],
            &["end", "finish", "stop"],
        ],
    ),
    (
        "status",
        &[
            &["status", "state", "condition", "phase", "stage"],
            &["active", "enabled", "live", "on"],
            &["deleted", "removed", "archived", "inactive", "disabled"],
            &["verified", "confirmed", "validated", "approved"],
            &["public", "visible", "open", "shared"],
            &["private", "hidden", "secret", "internal"],
        ],
    ),
    (
        "content",
        &[
            &["description", "desc", "summary", "details", "about", "bio"],
            &["message", "msg", "text", "body", "content", "payload"],
            &["comment", "note", "remark", "annotation"],
            &["image", "img", "picture", "photo", "avatar", "icon"],
            &["tag", "label", "marker", "flag", "keyword"],
        ],
    ),
    (
        "quantity",
        &[
            &["count", "number", "qty", "quantity", "num", "total"],
            &["amount", "value", "sum", "total", "balance"],
            &["price", "cost", "rate", "fee", "charge"],
            &["size", "length", "dimension", "magnitude", "width", "height"],
            &["age", "years"],
            &["currency", "money"],
        ],
    ),
    (
        "classification",
        &[
            &["type", "kind", "category", "class", "group", "classification", "sort"],
            &["version", "ver", "revision", "rev"],
            &["priority", "rank", "order", "position"],
        ],
    ),
    (
        "organisation",
        &[
            &["company", "organization", "organisation", "org", "business", "firm", "employer"],
            &["department", "division", "team", "unit"],
            &["job", "role", "position", "occupation"],
        ],
    ),
    (
        "collection",
        &[
            &["items", "list", "elements", "entries", "records", "data", "results"],
            &["metadata", "meta", "info", "properties", "attributes"],
            &["settings", "config", "configuration", "preferences", "options"],
        ],
    ),
];

/// Depth of the taxonomy root; domains sit at 2 and synonym sets at 3.
const ROOT_DEPTH: f64 = 1.0;
const DOMAIN_DEPTH: f64 = 2.0;
const SYNSET_DEPTH: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Sense {
    domain: usize,
    synset: usize,
}

static SENSES: LazyLock<AHashMap<&'static str, Vec<Sense>>> = LazyLock::new(|| {
    let mut map: AHashMap<&'static str, Vec<Sense>> = AHashMap::with_capacity(400);
    for (domain, (_, synsets)) in DOMAINS.iter().enumerate() {
        for (synset, words) in synsets.iter().enumerate() {
            for &word in *words {
                map.entry(word).or_default().push(Sense { domain, synset });
            }
        }
    }
    map
});

/// The built-in three-level taxonomy: root, domain, synonym set.
///
/// Wu-Palmer similarity is `2 * depth(lcs) / (depth(a) + depth(b))`, so two
/// words of the same set score 1.0, of the same domain 2/3 and otherwise 1/3.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lexicon;

impl Lexicon {
    fn senses(word: &str) -> Option<&'static [Sense]> {
        SENSES
            .get(word)
            .or_else(|| word.strip_suffix('s').and_then(|stem| SENSES.get(stem)))
            .map(Vec::as_slice)
    }

    fn wu_palmer(a: Sense, b: Sense) -> f64 {
        let lcs_depth = if a == b {
            SYNSET_DEPTH
        } else if a.domain == b.domain {
            DOMAIN_DEPTH
        } else {
            ROOT_DEPTH
        };
        2.0 * lcs_depth / (SYNSET_DEPTH + SYNSET_DEPTH)
    }
}

impl Ontology for Lexicon {
    fn similarity(&self, a: &str, b: &str) -> Option<f64> {
        let senses_a = Self::senses(a)?;
        let senses_b = Self::senses(b)?;
        senses_a
            .iter()
            .flat_map(|&sa| senses_b.iter().map(move |&sb| Self::wu_palmer(sa, sb)))
            .reduce(f64::max)
    }
}
