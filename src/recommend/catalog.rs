// Fixed per-label resource catalog

use serde::Serialize;

use crate::models::StateLabel;

/// A linkable support resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Resource {
    pub title: &'static str,
    pub url: &'static str,
    pub description: &'static str,
}

const fn resource(title: &'static str, url: &'static str, description: &'static str) -> Resource {
    Resource {
        title,
        url,
        description,
    }
}

/// Resources and messages for one state label
#[derive(Debug)]
pub struct CatalogEntry {
    pub videos: &'static [Resource],
    pub articles: &'static [Resource],
    pub professional: &'static [Resource],
    /// `None` falls back to the Normal list
    pub immediate_actions: Option<&'static [&'static str]>,
    pub message: &'static str,
    pub follow_up: &'static [&'static str],
}

/// Contacted whenever risk is high, regardless of label
pub const CRISIS_RESOURCES: [Resource; 3] = [
    resource(
        "National Suicide Prevention Lifeline: 988",
        "tel:988",
        "Free, confidential crisis support available 24/7/365",
    ),
    resource(
        "Crisis Text Line",
        "https://www.crisistextline.org/",
        "Text HOME to 741741 for free, 24/7 crisis counseling",
    ),
    resource(
        "Emergency Services",
        "tel:911",
        "Call 911 for immediate medical emergency assistance",
    ),
];

pub const EMERGENCY_ACTIONS: [&str; 4] = [
    "If you are in immediate danger, call 911",
    "Call the National Suicide Prevention Lifeline: 988",
    "Reach out to a trusted friend, family member, or mental health professional",
    "Go to your nearest emergency room or urgent care center",
];

pub const ESCALATION_SENTENCE: &str =
    " Please prioritize getting professional support as soon as possible.";

static NORMAL: CatalogEntry = CatalogEntry {
    videos: &[
        resource(
            "10 Daily Habits for Mental Wellness",
            "https://www.youtube.com/watch?v=3QIfkeA6HBY",
            "Simple daily practices to maintain good mental health",
        ),
        resource(
            "Mindfulness Meditation for Beginners",
            "https://www.youtube.com/watch?v=ZToicYcHIOU",
            "10-minute guided meditation for stress relief",
        ),
        resource(
            "Building Emotional Resilience",
            "https://www.youtube.com/watch?v=NUHsEmlIoE4",
            "Techniques to build emotional strength and resilience",
        ),
    ],
    articles: &[
        resource(
            "The Science of Well-Being",
            "https://www.helpguide.org/articles/mental-health/building-better-mental-health.htm",
            "Evidence-based strategies for maintaining mental wellness",
        ),
        resource(
            "Positive Psychology Practices",
            "https://positivepsychology.com/positive-psychology-exercises/",
            "Research-backed exercises to boost happiness and life satisfaction",
        ),
    ],
    professional: &[resource(
        "Psychology Today - Find a Therapist",
        "https://www.psychologytoday.com/us/therapists",
        "Find mental health professionals in your area",
    )],
    immediate_actions: Some(&[
        "Continue practicing good mental health habits",
        "Consider regular check-ins with yourself about your mental state",
        "Maintain social connections and support networks",
    ]),
    message: "Your conversation suggests you're managing your mental health well. Keep up the good work with self-care and stay aware of your mental state.",
    follow_up: &[
        "Continue regular self-check-ins about your mental health",
        "Maintain healthy lifestyle habits (exercise, sleep, nutrition)",
        "Consider mindfulness or meditation practices",
    ],
};

static DEPRESSION: CatalogEntry = CatalogEntry {
    videos: &[
        resource(
            "Understanding Depression - Mayo Clinic",
            "https://www.youtube.com/watch?v=z-IR48Mb3W0",
            "Comprehensive overview of depression symptoms and treatment",
        ),
        resource(
            "Cognitive Behavioral Therapy for Depression",
            "https://www.youtube.com/watch?v=0ViaCs0k2jQ",
            "CBT techniques to manage depressive thoughts",
        ),
        resource(
            "Depression Recovery: Daily Routine That Helps",
            "https://www.youtube.com/watch?v=OG6HZMMDEYA",
            "Practical daily routines for managing depression",
        ),
        resource(
            "Guided Meditation for Depression and Anxiety",
            "https://www.youtube.com/watch?v=ZToicYcHIOU",
            "Calming meditation specifically for depression relief",
        ),
    ],
    articles: &[
        resource(
            "Depression Treatment and Management",
            "https://www.nami.org/About-Mental-Illness/Mental-Health-Conditions/Depression",
            "Comprehensive guide to understanding and treating depression",
        ),
        resource(
            "Coping with Depression - Harvard Health",
            "https://www.health.harvard.edu/mind-and-mood/what-causes-depression",
            "Evidence-based strategies for managing depression",
        ),
        resource(
            "Self-Help Strategies for Depression",
            "https://www.helpguide.org/articles/depression/coping-with-depression.htm",
            "Practical self-help techniques for depression recovery",
        ),
    ],
    professional: &[
        resource(
            "National Suicide Prevention Lifeline",
            "https://suicidepreventionlifeline.org/",
            "Crisis support: Call 988 for immediate help",
        ),
        resource(
            "Depression and Bipolar Support Alliance",
            "https://www.dbsalliance.org/",
            "Support groups and resources for depression",
        ),
        resource(
            "SAMHSA National Helpline",
            "https://www.samhsa.gov/find-help/national-helpline",
            "1-800-662-4357 - Free, confidential treatment referral service",
        ),
    ],
    immediate_actions: Some(&[
        "Establish a daily routine with small, achievable goals",
        "Try to get some sunlight and fresh air each day",
        "Reach out to a friend or family member for support",
        "Consider scheduling an appointment with a mental health professional",
    ]),
    message: "Based on our conversation, it appears you may be experiencing symptoms of depression. This is treatable, and you don't have to go through this alone. The resources below can help you take the next steps toward feeling better.",
    follow_up: &[
        "Keep a daily mood journal to track patterns",
        "Set small, achievable daily goals",
        "Consider joining a support group",
        "Schedule regular follow-ups with a mental health professional",
    ],
};

static ANXIETY: CatalogEntry = CatalogEntry {
    videos: &[
        resource(
            "Anxiety Explained - Understanding Your Anxious Mind",
            "https://www.youtube.com/watch?v=WWloIAQpMcQ",
            "Understanding the science behind anxiety and panic",
        ),
        resource(
            "5-4-3-2-1 Grounding Technique for Anxiety",
            "https://www.youtube.com/watch?v=30VMIEmA114",
            "Quick technique to manage anxiety attacks",
        ),
        resource(
            "Breathing Exercises for Anxiety Relief",
            "https://www.youtube.com/watch?v=DbDoBzGY3vo",
            "Effective breathing techniques to calm anxiety",
        ),
        resource(
            "Progressive Muscle Relaxation for Anxiety",
            "https://www.youtube.com/watch?v=ihO02wUzgkc",
            "Guided muscle relaxation to reduce physical anxiety symptoms",
        ),
    ],
    articles: &[
        resource(
            "Anxiety Disorders - Mayo Clinic",
            "https://www.mayoclinic.org/diseases-conditions/anxiety/symptoms-causes/syc-20350961",
            "Comprehensive guide to anxiety disorders and treatment",
        ),
        resource(
            "Managing Anxiety - Practical Tips",
            "https://www.anxietyanddepressionassociation.org/tips-managing-anxiety-and-stress",
            "Evidence-based tips for managing anxiety in daily life",
        ),
        resource(
            "Cognitive Techniques for Anxiety",
            "https://www.helpguide.org/articles/anxiety/anxiety-disorders-and-anxiety-attacks.htm",
            "Cognitive strategies to overcome anxious thoughts",
        ),
    ],
    professional: &[
        resource(
            "Anxiety and Depression Association of America",
            "https://adaa.org/",
            "Resources, support groups, and professional help for anxiety",
        ),
        resource(
            "Crisis Text Line",
            "https://www.crisistextline.org/",
            "Text HOME to 741741 for free crisis counseling",
        ),
    ],
    immediate_actions: Some(&[
        "Practice deep breathing exercises when feeling anxious",
        "Use grounding techniques like the 5-4-3-2-1 method",
        "Limit caffeine intake which can increase anxiety",
        "Consider talking to a counselor about anxiety management techniques",
    ]),
    message: "Your messages indicate you might be dealing with anxiety. Many people experience anxiety, and there are effective techniques and treatments available to help you manage these feelings.",
    follow_up: &[
        "Practice daily relaxation techniques",
        "Identify and work on managing your anxiety triggers",
        "Consider cognitive behavioral therapy (CBT)",
        "Monitor your progress with anxiety management techniques",
    ],
};

static BIPOLAR: CatalogEntry = CatalogEntry {
    videos: &[
        resource(
            "Understanding Bipolar Disorder - Mayo Clinic",
            "https://www.youtube.com/watch?v=RrWfDgqIbcg",
            "Comprehensive overview of bipolar disorder",
        ),
        resource(
            "Living with Bipolar Disorder - Personal Stories",
            "https://www.youtube.com/watch?v=apLGdKKjFNA",
            "Real experiences and coping strategies from bipolar individuals",
        ),
        resource(
            "Mood Tracking for Bipolar Disorder",
            "https://www.youtube.com/watch?v=FvnnyY_h0GI",
            "How to track mood changes and identify triggers",
        ),
    ],
    articles: &[
        resource(
            "Bipolar Disorder Guide - NAMI",
            "https://www.nami.org/About-Mental-Illness/Mental-Health-Conditions/Bipolar-Disorder",
            "Complete guide to understanding bipolar disorder",
        ),
        resource(
            "Managing Bipolar Disorder",
            "https://www.webmd.com/bipolar-disorder/guide/bipolar-disorder-overview",
            "Treatment options and management strategies",
        ),
        resource(
            "Bipolar Self-Care Strategies",
            "https://www.helpguide.org/articles/bipolar-disorder/living-with-bipolar-disorder.htm",
            "Self-care techniques for managing bipolar symptoms",
        ),
    ],
    professional: &[
        resource(
            "Depression and Bipolar Support Alliance",
            "https://www.dbsalliance.org/",
            "Specialized support for bipolar disorder",
        ),
        resource(
            "International Bipolar Foundation",
            "https://ibpf.org/",
            "Education and support for bipolar individuals and families",
        ),
    ],
    immediate_actions: Some(&[
        "Maintain a consistent sleep schedule",
        "Track your mood changes and identify triggers",
        "Stay connected with your support system",
        "Contact your mental health provider if you notice significant mood changes",
    ]),
    message: "The patterns in our conversation suggest you may be experiencing symptoms related to bipolar disorder. Professional support can be very helpful in managing mood changes and developing coping strategies.",
    follow_up: &[
        "Maintain consistent daily routines",
        "Keep a detailed mood tracker",
        "Work with a psychiatrist on medication management if appropriate",
        "Build a strong support network of family and friends",
    ],
};

static SUICIDAL: CatalogEntry = CatalogEntry {
    videos: &[
        resource(
            "Suicide Prevention - Warning Signs and How to Help",
            "https://www.youtube.com/watch?v=WcSUs9iZv-g",
            "Understanding suicidal thoughts and getting help",
        ),
        resource(
            "Crisis Survival Skills - DBT",
            "https://www.youtube.com/watch?v=x3adCjQ_Bfg",
            "Dialectical behavior therapy techniques for crisis situations",
        ),
        resource(
            "Hope and Recovery from Suicidal Thoughts",
            "https://www.youtube.com/watch?v=WrqjmxPG1rM",
            "Personal stories of recovery and finding hope",
        ),
    ],
    articles: &[
        resource(
            "Suicide Prevention Resources - CDC",
            "https://www.cdc.gov/suicide/resources/index.html",
            "Comprehensive suicide prevention resources and strategies",
        ),
        resource(
            "Coping with Suicidal Thoughts",
            "https://www.suicidepreventionlifeline.org/help-yourself/attempt-survivors/",
            "Strategies for managing suicidal ideation",
        ),
    ],
    professional: &[
        resource(
            "Immediate Crisis Support",
            "tel:988",
            "Call 988 - National Suicide Prevention Lifeline (Available 24/7)",
        ),
        resource(
            "Crisis Text Line",
            "https://www.crisistextline.org/",
            "Text HOME to 741741 for immediate crisis support",
        ),
        resource(
            "Emergency Services",
            "tel:911",
            "Call 911 for immediate emergency assistance",
        ),
        resource(
            "National Suicide Prevention Lifeline",
            "https://suicidepreventionlifeline.org/",
            "Comprehensive crisis support and resources",
        ),
    ],
    // Only reachable with a non-high risk level, which the escalation rule never produces
    immediate_actions: None,
    message: "I'm very concerned about the thoughts and feelings you've shared. Your life has value, and there are people who want to help you through this difficult time. Please reach out for immediate support using the crisis resources below.",
    follow_up: &[
        "Follow up with crisis counselors or mental health professionals",
        "Create a safety plan with specific steps for crisis situations",
        "Remove any means of self-harm from your environment",
        "Stay connected with your support network daily",
    ],
};

/// Catalog entry for a label
pub fn entry(label: StateLabel) -> &'static CatalogEntry {
    match label {
        StateLabel::Normal => &NORMAL,
        StateLabel::Depression => &DEPRESSION,
        StateLabel::Anxiety => &ANXIETY,
        StateLabel::Bipolar => &BIPOLAR,
        StateLabel::Suicidal => &SUICIDAL,
    }
}

/// Immediate actions for a label, defaulting to the Normal list
pub fn immediate_actions(label: StateLabel) -> &'static [&'static str] {
    entry(label)
        .immediate_actions
        .or(NORMAL.immediate_actions)
        .unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_bounds() {
        for label in StateLabel::ALL {
            let e = entry(label);
            assert!(!e.videos.is_empty() && e.videos.len() <= 4, "{}", label);
            assert!(!e.articles.is_empty() && e.articles.len() <= 3, "{}", label);
            assert!(!e.professional.is_empty() && e.professional.len() <= 4, "{}", label);
            assert!(!e.follow_up.is_empty());
        }
    }

    #[test]
    fn test_suicidal_actions_fall_back_to_normal() {
        assert_eq!(
            immediate_actions(StateLabel::Suicidal),
            immediate_actions(StateLabel::Normal)
        );
        assert_eq!(immediate_actions(StateLabel::Anxiety).len(), 4);
    }
}
