//! Static content tables for the landing page.
//!
//! The gallery, pricing, testimonial and FAQ sections render straight from
//! these tables. Entries are immutable and compiled in.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::CoreError;

/// Gallery category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Men,
    Couple,
    Female,
    Kids,
}

impl Category {
    /// Display order of the category filter tabs.
    pub const ALL: [Category; 4] = [
        Category::Men,
        Category::Couple,
        Category::Female,
        Category::Kids,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Men => "men",
            Category::Couple => "couple",
            Category::Female => "female",
            Category::Kids => "kids",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CoreError::Validation(format!("Unknown category '{wanted}'")))
    }
}

/// One prompt in the gallery. `description` is the prompt text users copy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PromptEntry {
    pub title: &'static str,
    pub description: &'static str,
    pub rating: f32,
    pub reviews: u32,
    pub image_url: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PricingTier {
    pub name: &'static str,
    pub monthly_price_usd: u32,
    pub features: &'static [&'static str],
    /// Shown with the "Most Popular" badge.
    pub highlighted: bool,
    pub cta_label: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Testimonial {
    pub name: &'static str,
    pub role: &'static str,
    pub content: &'static str,
    pub avatar_url: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FaqEntry {
    pub question: &'static str,
    pub answer: &'static str,
}

const MEN: &[PromptEntry] = &[
    PromptEntry {
        title: "Men's Portrait Session",
        description: "Cinematic photo keeping the exact face from the reference image. Leaning on a vintage muscle car on a mountain road at golden hour, moody lighting, 4K.",
        rating: 4.8,
        reviews: 156,
        image_url: "/promptify/images/men1.jpg",
    },
    PromptEntry {
        title: "Men's Portrait Session",
        description: "Retro grainy 90s film look of the reference picture in a white suit, warm sunset tones against a deep shadowed wall, minimalist background.",
        rating: 4.8,
        reviews: 156,
        image_url: "/promptify/images/men2.jpg",
    },
    PromptEntry {
        title: "Outdoor Adventure Shoot",
        description: "Fashion editorial portrait in a dusky attic, soft window light with haze, warm amber glow, shallow depth of field, 3:4.",
        rating: 4.9,
        reviews: 142,
        image_url: "/promptify/images/men6.jpg",
    },
];

const COUPLE: &[PromptEntry] = &[
    PromptEntry {
        title: "Couple Portrait",
        description: "Romantic portrait of the two people from the reference image walking on a beach at sunset, faces unchanged, soft film grain.",
        rating: 4.9,
        reviews: 201,
        image_url: "/promptify/images/couple1.jpg",
    },
    PromptEntry {
        title: "Couple Portrait",
        description: "Candid rainy-street shot of the reference couple sharing an umbrella, neon reflections, cinematic color grade.",
        rating: 4.7,
        reviews: 118,
        image_url: "/promptify/images/couple2.jpg",
    },
];

const FEMALE: &[PromptEntry] = &[
    PromptEntry {
        title: "Women's Portrait Session",
        description: "Editorial portrait keeping the reference face identical, flowing saree in a sunlit courtyard, warm natural light, 8K detail.",
        rating: 4.9,
        reviews: 187,
        image_url: "/promptify/images/female1.jpg",
    },
    PromptEntry {
        title: "Women's Portrait Session",
        description: "Vintage Bollywood-style poster of the reference picture, chiffon drape, wind in hair, golden tones, grainy texture.",
        rating: 4.8,
        reviews: 164,
        image_url: "/promptify/images/female2.jpg",
    },
];

const KIDS: &[PromptEntry] = &[
    PromptEntry {
        title: "Kids Fantasy Shoot",
        description: "Playful storybook illustration of the child from the reference image riding a paper airplane over a pastel city.",
        rating: 4.9,
        reviews: 95,
        image_url: "/promptify/images/kids1.jpg",
    },
    PromptEntry {
        title: "Kids Fantasy Shoot",
        description: "Soft-lit studio portrait of the reference child in a tiny astronaut suit, stars in the background, keep facial features unchanged.",
        rating: 4.8,
        reviews: 77,
        image_url: "/promptify/images/kids2.jpg",
    },
];

const PRICING: &[PricingTier] = &[
    PricingTier {
        name: "Free",
        monthly_price_usd: 0,
        features: &["Access to basic prompts", "Copy to clipboard", "Community support"],
        highlighted: false,
        cta_label: "Get Started",
    },
    PricingTier {
        name: "Pro",
        monthly_price_usd: 19,
        features: &[
            "Everything in Free",
            "Premium prompt library",
            "Custom prompt sharing",
            "Priority support",
        ],
        highlighted: true,
        cta_label: "Start Pro Trial",
    },
    PricingTier {
        name: "Enterprise",
        monthly_price_usd: 99,
        features: &["Everything in Pro", "API access", "Team workspaces", "Dedicated support"],
        highlighted: false,
        cta_label: "Contact Sales",
    },
];

const TESTIMONIALS: &[Testimonial] = &[
    Testimonial {
        name: "Sarah Johnson",
        role: "Content Creator",
        content: "The prompts are detailed and get me what I need on the first try.",
        avatar_url: "/promptify/avatars/sarah.jpg",
    },
    Testimonial {
        name: "Michael Chen",
        role: "Marketing Director",
        content: "Saved our team hours on every campaign.",
        avatar_url: "/promptify/avatars/michael.jpg",
    },
    Testimonial {
        name: "Emily Rodriguez",
        role: "AI Researcher",
        content: "Carefully crafted prompts that work across models.",
        avatar_url: "/promptify/avatars/emily.jpg",
    },
];

const FAQS: &[FaqEntry] = &[
    FaqEntry {
        question: "What is Promptory?",
        answer: "A library of high-quality prompts for AI image generation.",
    },
    FaqEntry {
        question: "How do I use the prompts?",
        answer: "Find a prompt you like, copy it, and paste it into your AI tool.",
    },
    FaqEntry {
        question: "Are the prompts free to use?",
        answer: "Basic prompts are free; premium prompts come with Pro and Enterprise.",
    },
    FaqEntry {
        question: "Do you offer API access?",
        answer: "Yes, the Enterprise plan includes API access.",
    },
];

/// Prompts in one gallery category.
pub fn prompts(category: Category) -> &'static [PromptEntry] {
    match category {
        Category::Men => MEN,
        Category::Couple => COUPLE,
        Category::Female => FEMALE,
        Category::Kids => KIDS,
    }
}

pub fn find_prompt(category: Category, index: usize) -> Option<&'static PromptEntry> {
    prompts(category).get(index)
}

pub fn pricing_tiers() -> &'static [PricingTier] {
    PRICING
}

pub fn testimonials() -> &'static [Testimonial] {
    TESTIMONIALS
}

pub fn faqs() -> &'static [FaqEntry] {
    FAQS
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn every_category_has_entries() {
        for category in Category::ALL {
            assert!(!prompts(category).is_empty(), "{category} is empty");
        }
    }

    #[test]
    fn category_round_trips_through_str() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
        assert_eq!("KIDS".parse::<Category>().unwrap(), Category::Kids);
    }

    #[test]
    fn unknown_category_is_rejected() {
        assert_matches!("pets".parse::<Category>(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn find_prompt_is_bounds_checked() {
        assert!(find_prompt(Category::Men, 0).is_some());
        assert!(find_prompt(Category::Men, prompts(Category::Men).len()).is_none());
    }

    #[test]
    fn exactly_one_highlighted_tier() {
        assert_eq!(pricing_tiers().iter().filter(|t| t.highlighted).count(), 1);
    }
}
