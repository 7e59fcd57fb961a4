//! Writing through the process logger into the rotating file

mod scenario;
