//! Built-in content packs.
//!
//! Ids are partitioned per pack so packs can be combined freely:
//! `base` prompts 1.., responses 101..; `after_dark` prompts 501..,
//! responses 601...

use crate::cards::{Card, CardId, CardPack};

const BASE_PROMPTS: &[(&str, u8)] = &[
    ("The real reason the office fridge smells: ____.", 1),
    ("My therapist says I need to stop thinking about ____.", 1),
    ("Coming soon to a theater near you: ____, the musical.", 1),
    ("What ruined the family reunion this year?", 1),
    ("I never leave the house without ____.", 1),
    ("Scientists are baffled by ____.", 1),
    ("The school board has banned ____ from the library.", 1),
    ("What's the secret ingredient in grandma's soup?", 1),
    ("My dating profile simply says: ____.", 1),
    ("Breaking news: local man arrested for ____.", 1),
    ("The next big fitness trend is ____.", 1),
    ("What keeps the night-shift security guard awake?", 1),
    ("Nothing says romance like ____.", 1),
    ("This season on the cooking show: ____ with a side of regret.", 1),
    ("The best way to end a meeting early is ____.", 1),
    ("Rejected theme park ride: ____.", 1),
    ("What did the astronauts find on the far side of the moon?", 1),
    ("My superpower is ____, but only on Tuesdays.", 1),
    ("The wedding was going fine until ____.", 1),
    ("What's hiding at the bottom of the ball pit?", 1),
    ("Step one: ____. Step two: ____. Step three: profit.", 2),
    ("I traded ____ for ____ and I regret nothing.", 2),
    ("In the sequel, ____ teams up with ____.", 2),
    ("The museum's newest exhibit pairs ____ with ____.", 2),
];

const BASE_RESPONSES: &[&str] = &[
    "A suspiciously damp sock.",
    "Forty raccoons in a trench coat.",
    "The lingering smell of burnt popcorn.",
    "An inspirational poster of a cat.",
    "Aggressively mediocre jazz.",
    "My uncle's conspiracy podcast.",
    "A tax audit.",
    "Unsolicited life advice.",
    "A haunted vending machine.",
    "Emotional support lasagna.",
    "Reply-all.",
    "The group chat at 3 a.m.",
    "A motivational speaker who gave up halfway.",
    "Interpretive dance.",
    "A lukewarm bath.",
    "Accidentally liking a photo from 2011.",
    "The printer, once again.",
    "A spreadsheet with feelings.",
    "Competitive napping.",
    "Mandatory fun.",
    "A goose with a vendetta.",
    "Three kilograms of glitter.",
    "Small talk in the elevator.",
    "A very confident toddler.",
    "Pineapple on everything.",
    "My browser history.",
    "An expired coupon.",
    "A karaoke machine stuck on one song.",
    "The neighbor's leaf blower.",
    "Dramatic slow clapping.",
    "A smoke alarm chirping at 4 a.m.",
    "A pigeon that knows too much.",
    "Socks with sandals.",
    "Microwaved fish.",
    "The sound of a dial-up modem.",
    "A forgotten password.",
    "An alarming amount of mayonnaise.",
    "A self-help book about self-help books.",
    "Crying in the car park.",
    "A dramatic reading of the terms and conditions.",
    "Grandpa's flip phone.",
    "A wizard who only knows one spell.",
    "Unexpected bagpipes.",
    "The last slice of pizza.",
    "A raccoon in the attic.",
    "Parallel parking under pressure.",
    "A suspicious amount of cheese.",
    "An online course in underwater basket weaving.",
    "A spontaneous flash mob.",
    "A rubber duck debugging session.",
    "Eating cereal for dinner.",
    "A mime having a bad day.",
    "Hot sauce in the eye.",
    "The snooze button.",
    "An overly friendly golden retriever.",
    "A bicycle with square wheels.",
    "Soggy fries.",
    "A heated debate about the correct way to load a dishwasher.",
    "A lifetime supply of bubble wrap.",
    "The self-checkout machine.",
    "A cursed family heirloom.",
    "The intern.",
    "A bouncy castle in a hurricane.",
    "Doing taxes for fun.",
    "An accordion solo.",
    "A ghost who is bad at haunting.",
    "Extreme couponing.",
    "A yodeling contest.",
    "Buffering.",
    "The moon, but smaller.",
];

const AFTER_DARK_PROMPTS: &[(&str, u8)] = &[
    ("Nobody talks about what happened at ____ after midnight.", 1),
    ("The last thing you want to hear in a dark basement: ____.", 1),
    ("What's really in the witness protection program?", 1),
    ("My most embarrassing hospital visit involved ____.", 1),
    ("The bartender cut me off after ____.", 1),
    ("The haunted house's scariest room features ____.", 1),
    ("What did I find in my ex's storage unit?", 1),
    ("The cult leader's first commandment: ____.", 1),
    ("Last night I woke up next to ____ and ____.", 2),
    ("The séance went wrong when ____ met ____.", 2),
];

const AFTER_DARK_RESPONSES: &[&str] = &[
    "An unmarked van.",
    "A tattoo I don't remember getting.",
    "The walk of shame.",
    "A clown in the storm drain.",
    "Seven missed calls from Mom.",
    "A questionable kebab.",
    "Regrettable karaoke choices.",
    "The morning after.",
    "A Ouija board that only swears.",
    "A black market kidney.",
    "My evil twin.",
    "Breaking into the zoo.",
    "A midnight snack of questionable origin.",
    "Tequila.",
    "A shallow grave for my houseplants.",
    "The bouncer's disappointed look.",
    "A mysterious rash.",
    "Waking up in another city.",
    "A shady pawn shop.",
    "An unhinged voicemail.",
    "A vampire with a day job.",
    "Getting kicked out of a funeral.",
    "A bag of unlabeled pills.",
    "My cellmate, Gary.",
    "An exorcism on a budget.",
    "Crying at the club.",
    "A bet I definitely lost.",
    "Screaming into the void.",
    "The ex who still has my hoodie.",
    "A lifetime ban from the casino.",
];

/// The main pack.
#[must_use]
pub fn base_pack() -> CardPack {
    build("base", "Base Game", 1, BASE_PROMPTS, 101, BASE_RESPONSES)
}

/// Late-night extension pack.
#[must_use]
pub fn after_dark_pack() -> CardPack {
    build("after_dark", "After Dark", 501, AFTER_DARK_PROMPTS, 601, AFTER_DARK_RESPONSES)
}

/// Every built-in pack, base first.
#[must_use]
pub fn builtin_packs() -> Vec<CardPack> {
    vec![base_pack(), after_dark_pack()]
}

fn build(
    id: &str,
    name: &str,
    first_prompt: u32,
    prompts: &[(&str, u8)],
    first_response: u32,
    responses: &[&str],
) -> CardPack {
    let prompt_cards = (first_prompt..)
        .zip(prompts)
        .map(|(n, (text, pick))| Card::prompt(CardId::new(n), *text, id, *pick));
    let response_cards = (first_response..)
        .zip(responses)
        .map(|(n, text)| Card::response(CardId::new(n), *text, id));

    CardPack {
        cards: prompt_cards.chain(response_cards).collect(),
        ..CardPack::new(id, name)
    }
}
