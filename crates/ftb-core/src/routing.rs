//! The routing table: which labels keep a message in its topic, and where
//! mismatched messages go.
//!
//! Label matching is substring containment on the raw classifier output.
//! The classifier is a noisy text model, not a strict enum, so loose
//! matching is deliberate.

/// Symbolic forum topics known to the bot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Forum {
    JobPostings,
    CareerDiscussions,
    TrainingResources,
    ReportsArticles,
    CyberNews,
    CyberDiscussions,
}

impl Forum {
    pub const ALL: [Forum; 6] = [
        Forum::JobPostings,
        Forum::CareerDiscussions,
        Forum::TrainingResources,
        Forum::ReportsArticles,
        Forum::CyberNews,
        Forum::CyberDiscussions,
    ];

    /// Key used in the `FORUMS` section of the config file.
    pub fn key(self) -> &'static str {
        match self {
            Forum::JobPostings => "JOB_POSTINGS",
            Forum::CareerDiscussions => "CAREER_DISCUSSIONS",
            Forum::TrainingResources => "TRAINING_RESOURCES",
            Forum::ReportsArticles => "REPORTS_ARTICLES",
            Forum::CyberNews => "CYBER_NEWS",
            Forum::CyberDiscussions => "CYBER_DISCUSSIONS",
        }
    }

    /// Human-readable name used in forwarding notices.
    pub fn display_name(self) -> &'static str {
        match self {
            Forum::JobPostings => "Jobs",
            Forum::CareerDiscussions => "Career Discussions",
            Forum::TrainingResources => "Training",
            Forum::ReportsArticles => "Reports and Articles",
            Forum::CyberNews => "News",
            Forum::CyberDiscussions => "Cyber Discussions",
        }
    }
}

/// Where a mismatched message goes, and whether the move is announced in
/// the target topic. News and article topics are kept quiet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveTarget {
    pub target: Forum,
    pub notice: bool,
}

/// Routing policy for one source topic.
pub struct TopicPolicy {
    pub source: Forum,
    /// Labels that keep the message where it is. Always checked before
    /// any move decision, so a matching message costs no platform calls.
    pub stay: &'static [&'static str],
    /// Label-specific moves; first match wins.
    pub moves: &'static [(&'static str, MoveTarget)],
    /// Unconditional move when nothing above matched.
    pub fallback: Option<MoveTarget>,
}

/// The per-topic routing table. Only these topics are moderated; messages
/// in any other thread are left alone.
pub const POLICIES: [TopicPolicy; 4] = [
    TopicPolicy {
        source: Forum::JobPostings,
        stay: &["jobs", "career", "roles"],
        moves: &[],
        fallback: Some(MoveTarget {
            target: Forum::CareerDiscussions,
            notice: true,
        }),
    },
    TopicPolicy {
        source: Forum::TrainingResources,
        stay: &["training", "cert", "resource", "learn", "book", "reference"],
        moves: &[
            (
                "articles",
                MoveTarget {
                    target: Forum::ReportsArticles,
                    notice: false,
                },
            ),
            (
                "news",
                MoveTarget {
                    target: Forum::CyberNews,
                    notice: false,
                },
            ),
        ],
        fallback: Some(MoveTarget {
            target: Forum::CyberDiscussions,
            notice: true,
        }),
    },
    TopicPolicy {
        source: Forum::ReportsArticles,
        stay: &["articles"],
        moves: &[
            (
                "news",
                MoveTarget {
                    target: Forum::CyberNews,
                    notice: false,
                },
            ),
            (
                "others",
                MoveTarget {
                    target: Forum::CyberDiscussions,
                    notice: true,
                },
            ),
        ],
        fallback: None,
    },
    TopicPolicy {
        source: Forum::CyberNews,
        stay: &["news", "articles"],
        moves: &[(
            "others",
            MoveTarget {
                target: Forum::CyberDiscussions,
                notice: true,
            },
        )],
        fallback: None,
    },
];

pub fn policy_for(source: Forum) -> Option<&'static TopicPolicy> {
    POLICIES.iter().find(|p| p.source == source)
}

/// Verdict for one classified message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Stay,
    Move(MoveTarget),
}

/// Apply a topic policy to the classifier's label text.
pub fn decide(policy: &TopicPolicy, labels: &str) -> Verdict {
    if policy.stay.iter().any(|l| labels.contains(l)) {
        return Verdict::Stay;
    }

    for (label, mv) in policy.moves {
        if labels.contains(label) {
            return Verdict::Move(*mv);
        }
    }

    match policy.fallback {
        Some(mv) => Verdict::Move(mv),
        None => Verdict::Stay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(source: Forum, labels: &str) -> Verdict {
        decide(policy_for(source).unwrap(), labels)
    }

    fn moved_to(source: Forum, labels: &str) -> (Forum, bool) {
        match verdict(source, labels) {
            Verdict::Move(mv) => (mv.target, mv.notice),
            Verdict::Stay => panic!("expected a move for {labels:?}"),
        }
    }

    #[test]
    fn job_postings_keep_job_labels() {
        for labels in ["jobs", "career", "roles", " jobs\n"] {
            assert_eq!(verdict(Forum::JobPostings, labels), Verdict::Stay);
        }
    }

    #[test]
    fn job_postings_move_everything_else_with_notice() {
        assert_eq!(
            moved_to(Forum::JobPostings, "others"),
            (Forum::CareerDiscussions, true)
        );
        assert_eq!(
            moved_to(Forum::JobPostings, "news"),
            (Forum::CareerDiscussions, true)
        );
    }

    #[test]
    fn training_keeps_its_vocabulary() {
        for labels in ["training", "cert", "resource", "learn", "book", "reference"] {
            assert_eq!(verdict(Forum::TrainingResources, labels), Verdict::Stay);
        }
    }

    #[test]
    fn training_moves_articles_and_news_quietly() {
        assert_eq!(
            moved_to(Forum::TrainingResources, "articles"),
            (Forum::ReportsArticles, false)
        );
        assert_eq!(
            moved_to(Forum::TrainingResources, "news"),
            (Forum::CyberNews, false)
        );
    }

    #[test]
    fn training_falls_back_to_discussions_with_notice() {
        assert_eq!(
            moved_to(Forum::TrainingResources, "others"),
            (Forum::CyberDiscussions, true)
        );
    }

    #[test]
    fn training_prefers_articles_over_news_when_both_present() {
        // First match wins in listed order.
        assert_eq!(
            moved_to(Forum::TrainingResources, "news articles"),
            (Forum::ReportsArticles, false)
        );
    }

    #[test]
    fn articles_keep_articles_move_news_and_others() {
        assert_eq!(verdict(Forum::ReportsArticles, "articles"), Verdict::Stay);
        assert_eq!(
            moved_to(Forum::ReportsArticles, "news"),
            (Forum::CyberNews, false)
        );
        assert_eq!(
            moved_to(Forum::ReportsArticles, "others"),
            (Forum::CyberDiscussions, true)
        );
    }

    #[test]
    fn articles_leave_unknown_labels_alone() {
        assert_eq!(verdict(Forum::ReportsArticles, "jobs"), Verdict::Stay);
        assert_eq!(verdict(Forum::ReportsArticles, ""), Verdict::Stay);
    }

    #[test]
    fn news_keeps_news_and_articles() {
        assert_eq!(verdict(Forum::CyberNews, "news"), Verdict::Stay);
        assert_eq!(verdict(Forum::CyberNews, "articles"), Verdict::Stay);
    }

    #[test]
    fn news_moves_others_with_notice_and_ignores_the_rest() {
        assert_eq!(
            moved_to(Forum::CyberNews, "others"),
            (Forum::CyberDiscussions, true)
        );
        assert_eq!(verdict(Forum::CyberNews, "jobs"), Verdict::Stay);
    }

    #[test]
    fn stay_check_beats_move_labels() {
        // A noisy answer containing both a stay and a move label stays.
        assert_eq!(verdict(Forum::CyberNews, "news others"), Verdict::Stay);
        assert_eq!(
            verdict(Forum::TrainingResources, "training articles"),
            Verdict::Stay
        );
    }

    #[test]
    fn matching_is_substring_containment() {
        // Classifier output is free text; labels are detected anywhere in it.
        assert_eq!(verdict(Forum::JobPostings, "several roles open"), Verdict::Stay);
        assert_eq!(verdict(Forum::CyberNews, "breaking news!"), Verdict::Stay);
    }

    #[test]
    fn unmoderated_forums_have_no_policy() {
        assert!(policy_for(Forum::CareerDiscussions).is_none());
        assert!(policy_for(Forum::CyberDiscussions).is_none());
    }
}
