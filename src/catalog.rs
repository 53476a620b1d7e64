// src/catalog.rs

//! Static content: question bank, roadmap template, stream guides and the
//! demo student shown to parents exploring the app.

use crate::models::{
    catalog::{College, Course, Job, PsychOption, PsychQuestion, Scholarship, StreamGuide},
    personality::Stream,
    result::{QuizItem, RoadmapStep},
    share::ShareRecord,
};

fn option(id: &'static str, icon: &'static str, text: &'static str, trait_label: &'static str) -> PsychOption {
    PsychOption {
        id,
        icon,
        text,
        trait_label,
    }
}

fn question(id: u32, text: &'static str, a: PsychOption, b: PsychOption) -> PsychQuestion {
    PsychQuestion {
        id,
        question: text,
        options: vec![a, b],
    }
}

/// The ten psychometric questions, each with two trait-tagged options.
pub fn psych_questions() -> Vec<PsychQuestion> {
    vec![
        question(
            1,
            "Which activity sounds more engaging?",
            option("a", "🔭", "Solving a complex logic puzzle", "Analytical"),
            option("b", "🎨", "Designing a poster for an event", "Creative"),
        ),
        question(
            2,
            "A friend is upset. What do you do first?",
            option("a", "🤝", "Listen and comfort them", "Emotional"),
            option("b", "🧩", "Work out what went wrong", "Logical"),
        ),
        question(
            3,
            "In a group project you usually...",
            option("a", "📣", "Lead the team and present", "Confident"),
            option("b", "🛠️", "Build the actual model", "Practical"),
        ),
        question(
            4,
            "Which school subject do you look forward to?",
            option("a", "➗", "Mathematics", "Logical"),
            option("b", "📖", "Literature", "Creative"),
        ),
        question(
            5,
            "Your ideal weekend project is...",
            option("a", "🔌", "Repairing an old radio", "Practical"),
            option("b", "🧪", "Running a home science experiment", "Analytical"),
        ),
        question(
            6,
            "At a school fair you would rather...",
            option("a", "💰", "Run a stall and sell things", "Confident"),
            option("b", "🎭", "Perform in a short play", "Emotional"),
        ),
        question(
            7,
            "When you get a new gadget you...",
            option("a", "📊", "Compare specs and benchmarks", "Analytical"),
            option("b", "🔧", "Open it up to see how it works", "Practical"),
        ),
        question(
            8,
            "Which compliment would you like most?",
            option("a", "🧠", "You think very clearly", "Logical"),
            option("b", "💬", "You really understand people", "Emotional"),
        ),
        question(
            9,
            "Which role suits you in a debate?",
            option("a", "🎤", "Speaking on stage", "Confident"),
            option("b", "✏️", "Writing the arguments", "Creative"),
        ),
        question(
            10,
            "What interests you more about a car?",
            option("a", "🔧", "How the engine works", "Practical"),
            option("b", "🎨", "Its aesthetic design and shape", "Creative"),
        ),
    ]
}

fn quiz_item(question: &str, options: &[&str], correct: &str) -> QuizItem {
    QuizItem {
        question: question.to_string(),
        options: options.iter().map(|o| o.to_string()).collect(),
        correct: correct.to_string(),
    }
}

fn step(id: u32, title: &str, description: &str, quiz: Vec<QuizItem>) -> RoadmapStep {
    RoadmapStep {
        id,
        title: title.to_string(),
        description: description.to_string(),
        completed: false,
        quiz,
    }
}

/// Canonical roadmap. Every call returns a fresh copy with all steps incomplete.
pub fn roadmap_template() -> Vec<RoadmapStep> {
    vec![
        step(
            1,
            "Foundation",
            "Basic concepts & terminology",
            vec![
                quiz_item(
                    "What is the most important first step in career planning?",
                    &["Checking Salary", "Self Assessment", "Copying Friends"],
                    "Self Assessment",
                ),
                quiz_item(
                    "Which document summarises your education and skills?",
                    &["Resume", "Invoice", "Receipt"],
                    "Resume",
                ),
            ],
        ),
        step(
            2,
            "Intermediate Skills",
            "Core subject deep dive",
            vec![
                quiz_item(
                    "What is the best way to retain a new concept?",
                    &["Practice regularly", "Read once", "Skip revision"],
                    "Practice regularly",
                ),
                quiz_item(
                    "Which habit helps most in competitive exams?",
                    &["Timed mock tests", "Last-minute cramming", "Ignoring the syllabus"],
                    "Timed mock tests",
                ),
            ],
        ),
        step(
            3,
            "Advanced Projects",
            "Real-world application",
            vec![
                quiz_item(
                    "What makes a project valuable on a portfolio?",
                    &["Solving a real problem", "Its file size", "Copying a tutorial"],
                    "Solving a real problem",
                ),
                quiz_item(
                    "Why document your project?",
                    &["So others can understand it", "It is never needed", "To make it longer"],
                    "So others can understand it",
                ),
            ],
        ),
        step(
            4,
            "Internship Ready",
            "Portfolio & Interview prep",
            vec![
                quiz_item(
                    "How should you prepare for an interview?",
                    &["Research the organisation", "Arrive unprepared", "Memorise one answer"],
                    "Research the organisation",
                ),
                quiz_item(
                    "What should a cover letter highlight?",
                    &["Relevant skills", "Unrelated hobbies only", "Nothing"],
                    "Relevant skills",
                ),
            ],
        ),
    ]
}

/// Recommendations for a stream.
pub fn stream_guide(stream: Stream) -> StreamGuide {
    match stream {
        Stream::Science => StreamGuide {
            stream,
            description: "You have a strong analytical and logical mind. You enjoy understanding how things work and solving structured problems.",
            courses: vec![
                Course {
                    name: "Computer Science Engineering",
                    suitability: "High",
                    scholarships: "₹2L - ₹5L",
                    duration: "4 Years",
                    background: "Requires strong Math & Physics.",
                    skills: "Algorithms, AI/ML.",
                },
                Course {
                    name: "B.Sc. Physics",
                    suitability: "High",
                    scholarships: "₹50K - ₹1L",
                    duration: "3 Years",
                    background: "Strong Physics & Math in 12th.",
                    skills: "Experimentation, modelling.",
                },
                Course {
                    name: "MBBS",
                    suitability: "Medium",
                    scholarships: "₹1L - ₹3L",
                    duration: "5.5 Years",
                    background: "Requires Biology and NEET.",
                    skills: "Diagnosis, patient care.",
                },
            ],
            jobs: vec![
                Job {
                    title: "Software Architect",
                    salary: "₹12L - ₹30L",
                    growth: "High (15% YoY)",
                    desc: "Design complex software systems.",
                },
                Job {
                    title: "Data Scientist",
                    salary: "₹8L - ₹25L",
                    growth: "High (20% YoY)",
                    desc: "Turn data into decisions.",
                },
            ],
            colleges: vec![
                College {
                    name: "Jadavpur University, Kolkata",
                    fees: "₹10,000 / year",
                    kind: "Public",
                },
                College {
                    name: "NIT Trichy",
                    fees: "₹1.5L / year",
                    kind: "Public",
                },
            ],
            scholarships_ongoing: vec![Scholarship {
                name: "INSPIRE Scholarship",
                amount: "₹80,000 / year",
                eligibility: "Top 1% in 12th Boards",
            }],
        },
        Stream::Commerce => StreamGuide {
            stream,
            description: "You are confident and persuasive. Business, finance and leadership roles suit your drive.",
            courses: vec![
                Course {
                    name: "B.Com (Hons)",
                    suitability: "High",
                    scholarships: "₹25K - ₹1L",
                    duration: "3 Years",
                    background: "Commerce or Math in 12th.",
                    skills: "Accounting, taxation.",
                },
                Course {
                    name: "BBA",
                    suitability: "High",
                    scholarships: "₹50K - ₹2L",
                    duration: "3 Years",
                    background: "Any stream.",
                    skills: "Management, marketing.",
                },
            ],
            jobs: vec![
                Job {
                    title: "Chartered Accountant",
                    salary: "₹8L - ₹20L",
                    growth: "Stable (8% YoY)",
                    desc: "Audit, tax and financial advisory.",
                },
                Job {
                    title: "Product Manager",
                    salary: "₹15L - ₹35L",
                    growth: "High (12% YoY)",
                    desc: "Own a product from idea to market.",
                },
            ],
            colleges: vec![College {
                name: "Shri Ram College of Commerce, Delhi",
                fees: "₹30,000 / year",
                kind: "Public",
            }],
            scholarships_ongoing: vec![Scholarship {
                name: "Central Sector Scholarship",
                amount: "₹12,000 / year",
                eligibility: "Above 80th percentile in 12th",
            }],
        },
        Stream::Arts => StreamGuide {
            stream,
            description: "You are creative and empathetic. Design, communication and the humanities let you express ideas and understand people.",
            courses: vec![
                Course {
                    name: "B.Des (Communication Design)",
                    suitability: "High",
                    scholarships: "₹50K - ₹1.5L",
                    duration: "4 Years",
                    background: "Any stream, entrance portfolio.",
                    skills: "Visual design, storytelling.",
                },
                Course {
                    name: "BA Psychology",
                    suitability: "High",
                    scholarships: "₹20K - ₹80K",
                    duration: "3 Years",
                    background: "Any stream.",
                    skills: "Counselling, research.",
                },
            ],
            jobs: vec![
                Job {
                    title: "UX Designer",
                    salary: "₹6L - ₹20L",
                    growth: "High (14% YoY)",
                    desc: "Design products people enjoy using.",
                },
                Job {
                    title: "Clinical Psychologist",
                    salary: "₹5L - ₹15L",
                    growth: "Growing (10% YoY)",
                    desc: "Support mental health and wellbeing.",
                },
            ],
            colleges: vec![College {
                name: "National Institute of Design, Ahmedabad",
                fees: "₹3L / year",
                kind: "Public",
            }],
            scholarships_ongoing: vec![Scholarship {
                name: "Post Matric Scholarship",
                amount: "Full tuition",
                eligibility: "Family income below ₹2.5L",
            }],
        },
        Stream::Vocational => StreamGuide {
            stream,
            description: "You are hands-on and practical. Technical trades and applied engineering reward your ability to build and fix things.",
            courses: vec![
                Course {
                    name: "Diploma in Mechanical Engineering",
                    suitability: "High",
                    scholarships: "₹20K - ₹60K",
                    duration: "3 Years",
                    background: "10th pass with Science.",
                    skills: "Machining, CAD.",
                },
                Course {
                    name: "ITI Electrician",
                    suitability: "High",
                    scholarships: "₹10K - ₹30K",
                    duration: "2 Years",
                    background: "10th pass.",
                    skills: "Wiring, safety standards.",
                },
            ],
            jobs: vec![
                Job {
                    title: "Automobile Technician",
                    salary: "₹3L - ₹8L",
                    growth: "Growing (9% YoY)",
                    desc: "Service and repair modern vehicles.",
                },
                Job {
                    title: "CNC Programmer",
                    salary: "₹4L - ₹10L",
                    growth: "Stable (7% YoY)",
                    desc: "Program precision manufacturing machines.",
                },
            ],
            colleges: vec![College {
                name: "Government Polytechnic, Mumbai",
                fees: "₹8,000 / year",
                kind: "Public",
            }],
            scholarships_ongoing: vec![Scholarship {
                name: "PM YASASVI",
                amount: "₹75,000 / year",
                eligibility: "OBC/EBC students in technical courses",
            }],
        },
    }
}

/// Share record of the demo student a parent can view without linking.
pub fn demo_share() -> ShareRecord {
    let mut roadmap = roadmap_template();
    for s in roadmap.iter_mut().take(2) {
        s.completed = true;
    }
    ShareRecord {
        name: Some("Amrata".to_string()),
        stream: Some(Stream::Science),
        progress: Some(50),
        roadmap: Some(roadmap),
        monthly_progress: Some(vec![40, 55, 60, 75]),
        updated_at: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_bank_uses_known_traits() {
        use crate::models::personality::Trait;

        let questions = psych_questions();
        assert_eq!(questions.len(), 10);
        for q in &questions {
            for o in &q.options {
                assert!(o.trait_label.parse::<Trait>().is_ok(), "{}", o.trait_label);
            }
        }
    }

    #[test]
    fn roadmap_template_starts_incomplete() {
        let roadmap = roadmap_template();
        assert_eq!(roadmap.len(), 4);
        assert!(roadmap.iter().all(|s| !s.completed));
        assert!(roadmap.iter().all(|s| !s.quiz.is_empty()));
    }

    #[test]
    fn every_stream_has_a_guide() {
        for stream in Stream::ALL {
            let guide = stream_guide(stream);
            assert_eq!(guide.stream, stream);
            assert!(!guide.courses.is_empty());
        }
    }
}
