//! Strategic frameworks offered to the strategic-implications step.

/// A named marketing or strategy framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Framework {
    pub key: &'static str,
    pub name: &'static str,
    pub source: &'static str,
    pub use_when: &'static [&'static str],
    pub description: &'static str,
    pub key_questions: [&'static str; 3],
}

pub const FRAMEWORKS: &[Framework] = &[
    Framework {
        key: "jobs_to_be_done",
        name: "Jobs To Be Done (JTBD)",
        source: "Clayton Christensen",
        use_when: &["new product launch", "repositioning", "innovation", "customer motivation"],
        description: "Customers hire products to get functional, emotional and social jobs done.",
        key_questions: [
            "What job is the customer trying to get done?",
            "Which functional, emotional and social dimensions matter most?",
            "What workarounds are they using today?",
        ],
    },
    Framework {
        key: "category_entry_points",
        name: "Category Entry Points (CEPs)",
        source: "Ehrenberg-Bass Institute",
        use_when: &["brand awareness", "mental availability", "market penetration", "broad reach"],
        description: "Map the situations, needs and cues that bring the category to mind.",
        key_questions: [
            "When and where do people think of this category?",
            "Which entry points are frequent and ownable?",
            "How can the brand link itself to more of them?",
        ],
    },
    Framework {
        key: "brand_archetypes",
        name: "Brand Archetypes",
        source: "Carl Jung / Margaret Mark",
        use_when: &["brand identity", "tone of voice", "repositioning", "emotional connection"],
        description: "Anchor brand personality in a universal archetype such as Hero or Caregiver.",
        key_questions: [
            "Which archetype fits the brand's role in people's lives?",
            "What emotional territory does it own?",
            "How should the brand speak and act as a result?",
        ],
    },
    Framework {
        key: "cultural_tension",
        name: "Cultural Tension / Resolution",
        source: "Advertising strategy practice",
        use_when: &["campaign development", "creative briefs", "cultural relevance", "purpose-driven work"],
        description: "Find a live tension in culture the brand can credibly resolve.",
        key_questions: [
            "What tension is playing out in culture right now?",
            "What gives the brand permission to address it?",
            "What resolution does the brand offer?",
        ],
    },
    Framework {
        key: "mental_physical_availability",
        name: "Mental & Physical Availability",
        source: "Byron Sharp",
        use_when: &["market growth", "distribution strategy", "brand salience", "reach optimization"],
        description: "Brands grow by being easy to think of and easy to buy.",
        key_questions: [
            "How mentally available is the brand across buying situations?",
            "How easy is it to find and purchase?",
            "Which distinctive assets drive recognition?",
        ],
    },
    Framework {
        key: "blue_ocean",
        name: "Blue Ocean Strategy",
        source: "W. Chan Kim & Renee Mauborgne",
        use_when: &["differentiation", "new market creation", "avoiding competition", "innovation"],
        description: "Create uncontested market space instead of fighting in a crowded one.",
        key_questions: [
            "Which factors taken for granted can be eliminated?",
            "Which can be reduced well below the industry standard?",
            "Which can be raised or created that nobody offers?",
        ],
    },
    Framework {
        key: "porters_five_forces",
        name: "Porter's Five Forces",
        source: "Michael Porter",
        use_when: &["competitive analysis", "market entry", "strategic planning", "threat assessment"],
        description: "Read competitive intensity through five structural forces.",
        key_questions: [
            "How real is the threat of new entrants and substitutes?",
            "How much bargaining power do buyers and suppliers hold?",
            "How intense is the rivalry?",
        ],
    },
    Framework {
        key: "positioning",
        name: "Positioning Strategy",
        source: "Al Ries & Jack Trout",
        use_when: &["differentiation", "competitive response", "brand strategy", "messaging"],
        description: "Own a word or idea in the prospect's mind relative to competitors.",
        key_questions: [
            "Which position does the brand own, or could it own?",
            "Which positions do competitors hold?",
            "Where does the brand sit on the customer's mental ladder?",
        ],
    },
    Framework {
        key: "stepps",
        name: "STEPPS (Virality Framework)",
        source: "Jonah Berger",
        use_when: &["viral content", "word of mouth", "social campaigns", "earned media"],
        description: "Social currency, triggers, emotion, public, practical value and stories drive sharing.",
        key_questions: [
            "Does sharing this make people look good?",
            "What will trigger people to think of it?",
            "Which high-arousal emotion does it evoke?",
        ],
    },
    Framework {
        key: "elaboration_likelihood",
        name: "Elaboration Likelihood Model (ELM)",
        source: "Petty & Cacioppo",
        use_when: &["persuasion strategy", "messaging depth", "audience targeting", "creative"],
        description: "Match persuasion to audience involvement through central or peripheral routes.",
        key_questions: [
            "How motivated and able is the audience to process the message?",
            "Do strong arguments or simple cues work better here?",
            "What balance of information and emotion fits?",
        ],
    },
    Framework {
        key: "dramatic_structure",
        name: "Dramatic Structure / Story Arc",
        source: "Narrative theory",
        use_when: &["storytelling", "content strategy", "brand narrative", "campaign arcs"],
        description: "Build tension through setup, conflict and resolution.",
        key_questions: [
            "Who is the protagonist? (the customer, not the brand)",
            "What is the conflict or obstacle?",
            "What transformation happens?",
        ],
    },
    Framework {
        key: "behavioral_economics",
        name: "Behavioral Economics Principles",
        source: "Kahneman, Thaler, Ariely",
        use_when: &["conversion optimization", "choice architecture", "pricing", "habit formation"],
        description: "Use defaults, anchors and framing to shape decisions.",
        key_questions: [
            "Which defaults, anchors or frames apply?",
            "Where can friction drop and salience rise?",
            "Is there social proof or loss aversion to draw on?",
        ],
    },
    Framework {
        key: "customer_journey",
        name: "Customer Journey Mapping",
        source: "Service design practice",
        use_when: &["experience design", "touchpoint strategy", "funnel optimization", "customer experience"],
        description: "Map touchpoints and emotions across the customer lifecycle.",
        key_questions: [
            "What are the moments of truth?",
            "Where are the pain points and drop-offs?",
            "Where can the brand exceed expectations?",
        ],
    },
    Framework {
        key: "fogg_behavior",
        name: "Fogg Behavior Model",
        source: "BJ Fogg",
        use_when: &["behavior change", "habit formation", "engagement", "health campaigns"],
        description: "Behavior happens when motivation, ability and a prompt converge.",
        key_questions: [
            "Is motivation high enough?",
            "Is the behavior easy enough?",
            "Is there a clear prompt at the right moment?",
        ],
    },
    Framework {
        key: "paid_owned_earned",
        name: "Paid / Owned / Earned Media",
        source: "Forrester",
        use_when: &["media planning", "channel strategy", "budget allocation", "integrated campaigns"],
        description: "Balance investment across paid, owned and earned channels.",
        key_questions: [
            "What mix fits the objective?",
            "How can paid media spark earned attention?",
            "Which owned assets can be used?",
        ],
    },
    Framework {
        key: "see_think_do_care",
        name: "See-Think-Do-Care",
        source: "Avinash Kaushik",
        use_when: &["funnel strategy", "content planning", "audience segmentation", "measurement"],
        description: "Match content and channels to the audience's intent stage.",
        key_questions: [
            "What does the audience need at each stage?",
            "Which content and channels fit each stage?",
            "How is success measured at each stage?",
        ],
    },
    Framework {
        key: "design_thinking",
        name: "Design Thinking",
        source: "IDEO / Stanford d.school",
        use_when: &["innovation", "problem solving", "product development", "human-centered design"],
        description: "Empathize, define, ideate, prototype and test in fast iterations.",
        key_questions: [
            "What does the user actually need?",
            "How might the problem be reframed?",
            "What is the fastest way to test the assumptions?",
        ],
    },
    Framework {
        key: "lean_startup",
        name: "Lean Startup / MVP",
        source: "Eric Ries",
        use_when: &["new ventures", "product launch", "market testing", "resource constraints"],
        description: "Run build-measure-learn loops with minimum viable products.",
        key_questions: [
            "What is the riskiest assumption?",
            "What is the smallest experiment that tests it?",
            "What would trigger a pivot?",
        ],
    },
    Framework {
        key: "situational_crisis",
        name: "Situational Crisis Communication Theory (SCCT)",
        source: "Timothy Coombs",
        use_when: &["crisis response", "reputation management", "public relations", "issue management"],
        description: "Match the response to crisis type and attributed responsibility.",
        key_questions: [
            "How much responsibility is attributed to the organization?",
            "What is its crisis history and prior reputation?",
            "Deny, diminish, rebuild or bolster?",
        ],
    },
];

/// Substrings in the alert text that boost specific frameworks.
const KEYWORD_BOOSTS: &[(&str, &[&str])] = &[
    ("launch", &["jobs_to_be_done", "category_entry_points", "lean_startup"]),
    ("awareness", &["mental_physical_availability", "category_entry_points", "paid_owned_earned"]),
    ("viral", &["stepps", "cultural_tension", "dramatic_structure"]),
    ("crisis", &["situational_crisis", "positioning"]),
    ("differentiat", &["blue_ocean", "positioning", "brand_archetypes"]),
    ("competitor", &["porters_five_forces", "positioning", "blue_ocean"]),
    ("campaign", &["cultural_tension", "stepps", "see_think_do_care"]),
    ("rebrand", &["brand_archetypes", "positioning", "cultural_tension"]),
    ("content", &["stepps", "dramatic_structure", "see_think_do_care"]),
    ("conversion", &["behavioral_economics", "fogg_behavior", "customer_journey"]),
    ("health", &["fogg_behavior", "elaboration_likelihood", "customer_journey"]),
    ("pharma", &["elaboration_likelihood", "customer_journey", "situational_crisis"]),
    ("startup", &["lean_startup", "jobs_to_be_done", "blue_ocean"]),
    ("innovation", &["design_thinking", "jobs_to_be_done", "blue_ocean"]),
    ("social", &["stepps", "cultural_tension", "paid_owned_earned"]),
    ("purpose", &["cultural_tension", "brand_archetypes", "dramatic_structure"]),
    ("reposit", &["positioning", "brand_archetypes", "blue_ocean"]),
];

const FALLBACK: [&str; 2] = ["cultural_tension", "category_entry_points"];

const USE_WHEN_SCORE: u32 = 2;
const NAME_SCORE: u32 = 3;
const BOOST_SCORE: u32 = 3;

/// Words shorter than this never match; they hit almost any text.
const MIN_MATCH_LEN: usize = 3;

pub fn framework(key: &str) -> Option<&'static Framework> {
    FRAMEWORKS.iter().find(|f| f.key == key)
}

fn any_word_in(phrase: &str, text: &str) -> bool {
    phrase
        .split(|c: char| !c.is_alphanumeric() && c != '-')
        .filter(|w| w.chars().count() >= MIN_MATCH_LEN)
        .any(|w| text.contains(&w.to_lowercase()))
}

fn score(framework: &Framework, text: &str) -> u32 {
    let mut score = framework
        .use_when
        .iter()
        .filter(|condition| any_word_in(condition, text))
        .count() as u32
        * USE_WHEN_SCORE;
    if any_word_in(framework.name, text) {
        score += NAME_SCORE;
    }
    score
        + KEYWORD_BOOSTS
            .iter()
            .filter(|(keyword, targets)| text.contains(keyword) && targets.contains(&framework.key))
            .count() as u32
            * BOOST_SCORE
}

/// Pick the two best-scoring frameworks for `text`, or three when the third
/// ties the second. Ties keep table order.
pub fn select_frameworks(text: &str) -> Vec<&'static Framework> {
    let text = text.to_lowercase();
    let mut scored: Vec<(u32, &'static Framework)> =
        FRAMEWORKS.iter().map(|f| (score(f, &text), f)).collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    let mut take = 2;
    if scored.len() > 2 && scored[2].0 == scored[1].0 {
        take = 3;
    }
    let top: Vec<(u32, &'static Framework)> = scored.into_iter().take(take).collect();
    if top.iter().all(|(s, _)| *s == 0) {
        return FALLBACK.iter().filter_map(|key| framework(key)).collect();
    }
    top.into_iter().map(|(_, f)| f).collect()
}

pub fn framework_prompt(frameworks: &[&Framework]) -> String {
    let mut text = String::from("STRATEGIC FRAMEWORKS APPLIED:\n\n");
    for f in frameworks {
        text.push_str(&format!("**{}** ({})\n{}\nKey questions to address:\n", f.name, f.source, f.description));
        for q in f.key_questions {
            text.push_str(&format!("  - {q}\n"));
        }
        text.push('\n');
    }
    text.push_str("Apply these frameworks explicitly in your recommendations and show the reasoning.");
    text
}
