//! Labelled training sentences for the default naive Bayes model.
//! `true` marks a positive example.

pub(crate) const TRAINING_CORPUS: &[(&str, bool)] = &[
    ("a great win and a proud night for the campaign", true),
    ("supporters cheer as the candidate surges ahead", true),
    ("strong debate performance wins praise from voters", true),
    ("new poll shows a healthy lead and growing support", true),
    ("endorsement gives the campaign a welcome boost", true),
    ("an inspiring speech that lifted the crowd", true),
    ("the plan was praised as bold, smart and fair", true),
    ("record fundraising haul signals real momentum", true),
    ("voters say they trust her and feel hopeful", true),
    ("a confident, upbeat rally full of energy", true),
    ("the bill passed with broad bipartisan support", true),
    ("the economy is improving and jobs are growing", true),
    ("union leaders applaud the new proposal", true),
    ("an impressive victory in a key state", true),
    ("his message of unity resonates with young voters", true),
    ("analysts call it the best week of the race", true),
    ("turnout was excellent and volunteers were thrilled", true),
    ("a landmark deal that delivers for families", true),
    ("the town hall was a big success", true),
    ("she won the endorsement of a popular governor", true),
    ("campaign celebrates a clear and decisive triumph", true),
    ("a warm welcome and a cheering crowd", true),
    ("honest answers earn him credit with undecided voters", true),
    ("the announcement was met with enthusiasm and applause", true),
    ("a terrible night and an embarrassing loss", false),
    ("the campaign is struggling and donors are worried", false),
    ("critics slam the plan as reckless and costly", false),
    ("a scandal deepens as new allegations emerge", false),
    ("poll numbers collapse after a weak debate", false),
    ("the candidate faces angry protesters and boos", false),
    ("officials warn of chaos and confusion at the polls", false),
    ("a bitter attack ad draws widespread outrage", false),
    ("investigation finds fraud and corruption", false),
    ("the rollout was a disaster from start to finish", false),
    ("voters say they do not trust him", false),
    ("staff quit amid turmoil and infighting", false),
    ("fundraising slumps and the campaign cuts jobs", false),
    ("a gaffe that could cost him the nomination", false),
    ("the lawsuit threatens to derail the campaign", false),
    ("experts call the proposal dangerous and misleading", false),
    ("the rally was marred by violence and fear", false),
    ("a humiliating defeat in his home state", false),
    ("the response to the crisis was slow and inadequate", false),
    ("rivals blame her for the failed negotiations", false),
    ("accusations of lies and dishonest statements", false),
    ("a worst case scenario for the party", false),
    ("the economy is weakening and layoffs are rising", false),
    ("supporters are frustrated and disappointed", false),
];
