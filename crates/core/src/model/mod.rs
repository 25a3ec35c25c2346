mod favorite;
mod interrupt;
mod profile;
mod progress;
mod quiz;
mod streak;
mod topic;

pub use favorite::{FavoriteState, FavoriteToggle};
pub use interrupt::{GuestSnapshot, InterruptedAction};
pub use profile::Profile;
pub use progress::{AttemptOutcome, QuizAttempt, QuizStateError, TopicQuizState};
pub use quiz::{MIN_OPTIONS, OptionKey, QuizQuestion, QuizQuestionError};
pub use streak::{
    ExtendOutcome, LiveStreak, ParseStreakIdError, RECORD_MIN_SCORE, StreakError, StreakId,
    StreakRecord,
};
pub use topic::{Topic, TopicError};
