use crate::models::question::{CategoryTuple, Difficulty, OptionLabel, Question};

/// Curated starter set, inserted into an empty pool when `SEED_QUESTIONS=true`.
pub fn default_questions() -> Vec<Question> {
    let physics = |d| CategoryTuple::new("JEE", "Physics", "Mechanics", d);
    let chemistry = CategoryTuple::new("JEE", "Chemistry", "Organic", Difficulty::Easy);
    let calculus = |d| CategoryTuple::new("JEE", "Mathematics", "Calculus", d);

    vec![
        Question::curated(
            &physics(Difficulty::Easy),
            "What is the SI unit of force?",
            ["Newton", "Joule", "Watt", "Pascal"],
            OptionLabel::A,
            "The Newton (N) is the SI unit of force. It is the force required to accelerate a mass of 1 kg at 1 m/s².",
        ),
        Question::curated(
            &physics(Difficulty::Easy),
            "What is the acceleration due to gravity on Earth?",
            ["9.8 m/s²", "10 m/s²", "12 m/s²", "8.9 m/s²"],
            OptionLabel::A,
            "The acceleration due to gravity on Earth is approximately 9.8 m/s².",
        ),
        Question::curated(
            &physics(Difficulty::Medium),
            "A body of mass 2 kg is moving with a velocity of 3 m/s. What is its kinetic energy?",
            ["9 J", "6 J", "3 J", "12 J"],
            OptionLabel::A,
            "Kinetic energy = (1/2)mv² = (1/2) × 2 × 3² = 9 J",
        ),
        Question::curated(
            &physics(Difficulty::Medium),
            "What is the momentum of a 5 kg object moving at 2 m/s?",
            ["10 kg·m/s", "7 kg·m/s", "3 kg·m/s", "25 kg·m/s"],
            OptionLabel::A,
            "Momentum = mass × velocity = 5 × 2 = 10 kg·m/s",
        ),
        Question::curated(
            &physics(Difficulty::Hard),
            "A particle moves in a circle of radius R with constant speed v. What is the centripetal acceleration?",
            ["v²/R", "vR", "v/R", "Rv²"],
            OptionLabel::A,
            "Centripetal acceleration = v²/R, directed towards the center of the circle.",
        ),
        Question::curated(
            &physics(Difficulty::Hard),
            "Two masses m1 and m2 are connected by a string passing over a frictionless pulley. What is the acceleration of the system?",
            ["g(m1-m2)/(m1+m2)", "g(m1+m2)/(m1-m2)", "g", "g/2"],
            OptionLabel::A,
            "For an Atwood machine, acceleration = g(m1-m2)/(m1+m2)",
        ),
        Question::curated(
            &chemistry,
            "What is the hybridisation of carbon in methane?",
            ["sp³", "sp²", "sp", "sp³d"],
            OptionLabel::A,
            "Carbon in methane is sp³ hybridised with bond angle 109.5°.",
        ),
        Question::curated(
            &chemistry,
            "Which gas is evolved when sodium reacts with water?",
            ["Hydrogen", "Oxygen", "Nitrogen", "Carbon dioxide"],
            OptionLabel::A,
            "Sodium reacts with water to produce sodium hydroxide and hydrogen gas.",
        ),
        Question::curated(
            &calculus(Difficulty::Easy),
            "What is the derivative of x²?",
            ["2x", "x", "2", "x²"],
            OptionLabel::A,
            "d/dx(x²) = 2x using power rule.",
        ),
        Question::curated(
            &calculus(Difficulty::Medium),
            "What is the integral of 2x dx?",
            ["x² + C", "2x² + C", "x + C", "2 + C"],
            OptionLabel::A,
            "∫2x dx = x² + C",
        ),
    ]
}
